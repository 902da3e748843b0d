use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub media_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| Error::Configuration("DATABASE_URL is not set".to_string()))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| Error::Configuration("JWT_SECRET is not set".to_string()))?;
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| String::from("127.0.0.1:3000"))
            .parse()
            .map_err(|_| Error::Configuration("BIND_ADDR is not a valid socket address".to_string()))?;
        let media_root: PathBuf = env::var("MEDIA_ROOT")
            .unwrap_or_else(|_| String::from("media"))
            .into();

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            media_root,
        })
    }
}
