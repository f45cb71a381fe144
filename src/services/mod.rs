/*!
 * Resource services
 * Load the target, ask the policy, then mutate. Handlers stay thin.
 */
pub mod blog;
pub mod messages;
pub mod projects;
pub mod users;
pub mod validation;
