pub const SESSION_LIFETIME_HOURS: i64 = 1;

pub const AUTHORIZATION_SCHEME: &str = "Bearer ";

pub const RECIPE_IMAGE_DIR: &str = "recipe";

pub const MAX_IMAGE_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
