//! Application constants

/// Storage bucket name for uploaded media
pub const BUCKET_NAME: &str = "videotube_media_data";

/// Maximum upload size for video publishing (100 MB)
pub const MAX_UPLOAD_SIZE: usize = 100 * 1024 * 1024;

/// Default page size for paginated list endpoints
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size for paginated list endpoints
pub const MAX_PAGE_SIZE: i64 = 100;

/// Access token lifetime in minutes
pub const ACCESS_TOKEN_EXPIRY_MINUTES: i64 = 15;

/// Refresh token lifetime in days
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 10;

/// Fixed system preamble for the chatbot proxy. The model only ever sees
/// user prompts appended after this.
pub const WEBSITE_CONTEXT: &str = "\
You are an AI assistant for a YouTube-like video platform.

Website features:
- Users can watch videos
- Like and dislike videos
- Subscribe to channels
- Create and manage playlists
- Comment on videos
- Login and signup functionality
- AI chatbot for user help

Your role:
- Help users understand website features
- Guide users on how to use the platform
- Answer questions related ONLY to this platform
- If a question is unrelated, politely redirect back to platform topics

Tone:
- Friendly
- Clear
- Short and helpful
";

/// Canned reply when the upstream AI call fails
pub const CHATBOT_APOLOGY: &str =
    "Sorry, I'm having trouble answering right now. Please try again in a moment.";
