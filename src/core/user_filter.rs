use crate::domain::model::User;

/// Filter factory users by role name.
///
/// Users holding any forbidden role are removed first. Then, when
/// `required_roles` is not empty, only users holding at least one required
/// role are kept. Removal wins over retention. Order is preserved.
pub fn filter_users<S: AsRef<str>>(
    users: &[User],
    required_roles: &[S],
    forbidden_roles: &[S],
) -> Vec<User> {
    users
        .iter()
        .filter(|user| {
            let roles = user.role_names();
            let holds_any = |wanted: &[S]| wanted.iter().any(|r| roles.contains(r.as_ref()));

            if holds_any(forbidden_roles) {
                return false;
            }
            required_roles.is_empty() || holds_any(required_roles)
        })
        .cloned()
        .collect()
}
