use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server_name: String,
    pub album_root: String,
    pub rest_port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server_name: std::env::var("SERVER_NAME")
                .unwrap_or_else(|_| "Shoebox".to_string()),
            album_root: std::env::var("ALBUM_ROOT")
                .unwrap_or_else(|_| "./albums".to_string()),
            rest_port: std::env::var("REST_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
        })
    }
}
