use std::net::SocketAddr;

#[derive(Clone)]
#[allow(dead_code)]
pub enum Env {
    Dev,
    Staging,
    Production,
}

pub struct ServerConfig {
    pub env: Env,
    pub listen_addr: SocketAddr,
    pub database_url: String,
    /// Canonical origin used when building absolute post URLs, e.g.
    /// `https://blog.example.com`. No trailing slash.
    pub base_url: String,
}

fn var(key: &str) -> Result<Option<String>, String> {
    match std::env::var(key) {
        Ok(env) => Ok(Some(env)),
        Err(e) => match e {
            std::env::VarError::NotPresent => Ok(None),
            std::env::VarError::NotUnicode(_) => Err(format!(
                "Could not get the environment variable `{key}` due to unicode error"
            )),
        },
    }
}

fn required_var(key: &str) -> String {
    let val = var(key);
    match val {
        Ok(val) => match val {
            Some(val) => val,
            None => {
                tracing::error!("Environment variable `{key}` is required");
                std::process::exit(1)
            }
        },
        Err(e) => {
            tracing::error!(
                "Environment variable `{key}` is required, but could not retrieve: {e}"
            );
            std::process::exit(1)
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    match var(key) {
        Ok(Some(val)) => val,
        _ => default.to_owned(),
    }
}

impl ServerConfig {
    pub fn new_from_env() -> Self {
        let listen_addr = var_or("LISTEN_ADDR", "0.0.0.0:3000")
            .parse()
            .unwrap_or_else(|e| {
                tracing::error!("Could not parse LISTEN_ADDR: {e}");
                std::process::exit(1)
            });

        let mut base_url = var_or("BASE_URL", "http://localhost:3000");
        while base_url.ends_with('/') {
            base_url.pop();
        }

        ServerConfig {
            env: match var("ENVIRONMENT") {
                Ok(Some(env)) => match env.as_str() {
                    "dev" => Env::Dev,
                    "staging" => Env::Staging,
                    "production" => Env::Production,
                    _ => Env::Dev,
                },
                _ => Env::Dev,
            },
            listen_addr,
            database_url: required_var("DATABASE_URL"),
            base_url,
        }
    }
}
