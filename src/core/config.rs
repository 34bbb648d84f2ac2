use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub web_ui_path: String,
    // Link used as the call to action in subscriber emails
    pub app_url: String,
    pub mail_reply_to: String,
    // IANA time zone used when rendering event times in emails
    pub timezone: String,
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("EKOLI_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = env::var("EKOLI_DB_PATH")
            .unwrap_or_else(|_| format!("{}/ekoli.sqlite", storage_path.trim_end_matches('/')));
        let web_ui_path = env::var("EKOLI_WEB_UI_PATH").unwrap_or("./web-ui".to_string());
        let app_url = env::var("EKOLI_APP_URL")
            .unwrap_or_else(|_| "https://ekolicalendar.web.app".to_string());
        let mail_reply_to =
            env::var("EKOLI_MAIL_REPLY_TO").unwrap_or_else(|_| "info@ekoli.be".to_string());
        let timezone = env::var("EKOLI_TIMEZONE").unwrap_or_else(|_| "Europe/Brussels".to_string());
        let google_client_id = env::var("EKOLI_GOOGLE_CLIENT_ID").ok();
        let google_tokeninfo_url = env::var("EKOLI_GOOGLE_TOKENINFO_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/tokeninfo".to_string());

        Self {
            storage_path,
            db_path,
            web_ui_path,
            app_url,
            mail_reply_to,
            timezone,
            google_client_id,
            google_tokeninfo_url,
        }
    }
}
