pub mod network {
    pub const SCRAPER_API_BASE_URL: &str = "https://scraperapi.thordata.com";
    pub const WEB_UNLOCKER_BASE_URL: &str = "https://webunlocker.thordata.com";
    pub const REQUEST_PATH: &str = "/request";
    pub const TIMEOUT_REQUEST_MS: u64 = 300_000;
    pub const ALLOWED_SCHEMES: &[&str] = &["http://", "https://"];
    pub const DEFAULT_SCHEME: &str = "https://";
}

pub mod limits {
    pub const SEARCH_NUM_DEFAULT: u32 = 10;
    pub const SEARCH_NUM_MIN: u32 = 1;
    pub const SEARCH_NUM_MAX: u32 = 50;
    pub const LOG_BODY_PREVIEW_BYTES: usize = 512;
    pub const ERROR_BODY_PREVIEW_BYTES: usize = 300;
}

pub mod headers {
    pub const TOKEN: &str = "token";
    pub const API_KEY: &str = "apikey";
    pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
    pub const ACCEPT: &str = "application/json, text/html, image/png, */*";
}

pub mod binary {
    pub const PNG_MIME_TYPE: &str = "image/png";
    pub const PNG_FILE_NAME: &str = "screenshot.png";
    pub const SCREENSHOT_MESSAGE: &str = "Screenshot captured successfully";
}

pub mod upstream {
    /// Body fields inspected, in order, for a human-readable error message.
    pub const ERROR_MESSAGE_FIELDS: &[&str] = &["msg", "message", "error", "detail"];
}

pub mod env {
    pub const TOKEN: &str = "THORDATA_TOKEN";
    pub const PUBLIC_TOKEN: &str = "THORDATA_PUBLIC_TOKEN";
    pub const PUBLIC_KEY: &str = "THORDATA_PUBLIC_KEY";
    pub const SCRAPER_API_BASE_URL: &str = "THORDATA_SCRAPER_API_BASE_URL";
    pub const WEB_UNLOCKER_BASE_URL: &str = "THORDATA_WEB_UNLOCKER_BASE_URL";
    pub const TIMEOUT_MS: &str = "THORDATA_TIMEOUT_MS";
    pub const CONTINUE_ON_FAIL: &str = "THORDATA_CONTINUE_ON_FAIL";
}
