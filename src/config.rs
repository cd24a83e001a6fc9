//! Application-level configuration constants.

// Server endpoints
pub const NEW_GAME_PATH: &str = "/new_game";
pub const MAKE_GUESS_PATH: &str = "/make_guess";
pub const UPLOAD_PATH: &str = "/upload";
pub const REPLACE_COLOR_PATH: &str = "/replace_color";
pub const DELETE_PIECE_PATH: &str = "/delete_piece";
pub const SAVE_PLAN_PATH: &str = "/save_plan";
pub const GENERATE_REPLICA_PATH: &str = "/generate_replica";
pub const DOWNLOAD_PATH: &str = "/download";

// Generated files offered for download
pub const PLAN_FILE: &str = "cutting_plan.json";
pub const REPLICA_FILE: &str = "replica.png";

// Guess game
pub const MAX_ATTEMPTS: u32 = 10;
pub const MAX_STONES: usize = 5;

// UI behavior
pub const STATUS_CLEAR_MS: u32 = 6000;
/// Pointer travel (px) below which a press-release counts as a click.
pub const CLICK_SLOP_PX: f64 = 3.0;

// Drawing
pub const HIGHLIGHT_FILL: &str = "rgba(255, 255, 0, 0.5)";
pub const PIECE_STROKE: &str = "black";

// Messages
pub const EMPTY_ANALYSIS_MSG: &str = "No glass pieces were found in the image.";

/// Where the server lives. Empty base means same origin.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Join an absolute endpoint path or a server-relative asset path onto the base.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn download_url(&self, file: &str) -> String {
        self.url(&format!("{}/{}", DOWNLOAD_PATH, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_origin_urls_are_rooted() {
        let config = ApiConfig::default();
        assert_eq!(config.url(UPLOAD_PATH), "/upload");
        assert_eq!(config.url("uploads/vitraz.png"), "/uploads/vitraz.png");
        assert_eq!(config.download_url(PLAN_FILE), "/download/cutting_plan.json");
    }

    #[test]
    fn base_url_is_joined_without_double_slashes() {
        let config = ApiConfig::new("http://localhost:5000/");
        assert_eq!(config.url("/make_guess"), "http://localhost:5000/make_guess");
        assert_eq!(config.url("outputs/replica.png"), "http://localhost:5000/outputs/replica.png");
    }

    #[test]
    fn absolute_asset_urls_pass_through() {
        let config = ApiConfig::new("http://a");
        assert_eq!(config.url("https://cdn/x.png"), "https://cdn/x.png");
    }
}
