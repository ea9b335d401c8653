/// Credentials and upload options for the image store.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub api_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub upload_width: u32,
}

/// Process-wide settings, read once in `main` and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub frontend_url: String,
    pub media: MediaConfig,
}

impl Config {
    /// Panics on a missing required variable; this only runs at startup.
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let frontend_url = std::env::var("FRONTEND_URL").expect("FRONTEND_URL must be set");

        let media = MediaConfig {
            api_url: optional("MEDIA_API_URL", "https://api.cloudinary.com"),
            cloud_name: std::env::var("CLOUDINARY_CLOUD_NAME")
                .expect("CLOUDINARY_CLOUD_NAME must be set"),
            api_key: std::env::var("CLOUDINARY_API_KEY").expect("CLOUDINARY_API_KEY must be set"),
            api_secret: std::env::var("CLOUDINARY_API_SECRET")
                .expect("CLOUDINARY_API_SECRET must be set"),
            folder: optional("MEDIA_FOLDER", "hijab-styles"),
            upload_width: optional("MEDIA_UPLOAD_WIDTH", "1500")
                .parse::<u32>()
                .expect("MEDIA_UPLOAD_WIDTH must be a positive integer"),
        };

        Config {
            database_url,
            jwt_secret,
            jwt_maxage: jwt_maxage
                .parse::<i64>()
                .expect("JWT_MAXAGE must be a number of seconds"),
            port: optional("PORT", "5000")
                .parse::<u16>()
                .expect("PORT must be a valid port number"),
            frontend_url,
            media,
        }
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
