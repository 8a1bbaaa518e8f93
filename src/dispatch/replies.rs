//! User-facing reply texts

use crate::media::VideoInfo;

pub const HELP: &str = "📖 *How to use this bot:*\n\n\
1️⃣ Send me any YouTube link\n\
2️⃣ I'll download the video (360p)\n\
3️⃣ The video will be sent back to you\n\n\
*Commands:*\n\
/start - Welcome message\n\
/help - This help message\n\
/echo <text> - Repeat your text\n\
/download <url> - Explicitly download a video\n\n\
*Examples:*\n\
• https://youtube.com/watch?v=dQw4w9WgXcQ\n\
• https://youtu.be/dQw4w9WgXcQ\n\n\
⚡ Just paste the link and I'll handle the rest!";

pub const GUIDANCE: &str = "👋 Send me a YouTube link and I'll download the video for you!\n\n\
Example: https://youtube.com/watch?v=...\n\n\
Or use /help to see available commands.";

pub const UNKNOWN_COMMAND: &str = "❓ Unknown command. Type /help to see available commands.";

pub const ECHO_USAGE: &str = "Nothing to echo. Example: /echo hello";

pub const DOWNLOAD_USAGE: &str =
    "Please provide a YouTube URL. Example: /download https://youtube.com/watch?v=...";

pub const INVALID_URL: &str =
    "❌ Invalid YouTube URL. Please provide a valid YouTube or youtu.be link.";

pub const FETCHING_INFO: &str = "🔍 Fetching video information...";

pub const INFO_FAILED: &str =
    "❌ Failed to get video information. Please check the URL and try again.";

pub const DOWNLOAD_FAILED: &str = "❌ Download failed. This might be due to:\n\
• Video is private or age-restricted\n\
• Video is too long\n\
• Regional restrictions\n\n\
Please try another video.";

pub const TOO_LARGE: &str = "❌ Video is too large (>50MB). Telegram bots can only send files up to 50MB.\n\n\
Try a shorter video.";

pub const UPLOADING: &str = "📤 Uploading to Telegram...";

pub const UPLOAD_FAILED: &str = "❌ Failed to upload video to Telegram. The file might be too large or in an unsupported format.";

pub const SENT: &str = "✅ Video sent successfully! Send another link to download more videos.";

/// Greeting for `/start`
#[must_use]
pub fn welcome(first_name: &str) -> String {
    format!(
        "Hello {first_name}! 👋\n\n\
I'm your YouTube downloader bot. Just send me a YouTube link and I'll download the video for you!\n\n\
📹 Supported formats:\n\
• YouTube URLs (youtube.com/watch?v=...)\n\
• YouTube short URLs (youtu.be/...)\n\n\
The video will be downloaded in 360p quality for optimal file size and compatibility.\n\n\
Type /help for more info."
    )
}

/// Announcement sent once metadata is known
#[must_use]
pub fn starting_download(info: &VideoInfo, quality_label: &str) -> String {
    format!(
        "📹 *{}*\n\n⏱ Duration: {}\n📊 Quality: {quality_label}\n\n⬇️ Downloading video...",
        info.title,
        format_duration(info.duration)
    )
}

/// Human-readable duration
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds} seconds");
    }

    let minutes = seconds / 60;
    let secs = seconds % 60;
    if minutes < 60 {
        return if secs == 0 {
            format!("{minutes} minutes")
        } else {
            format!("{minutes} min {secs} sec")
        };
    }

    format!("{} hr {} min", minutes / 60, minutes % 60)
}
