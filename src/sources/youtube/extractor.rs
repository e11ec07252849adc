//! Readers for InnerTube player and search responses.
//!
//! Upstream changes shape without notice, so every field access here is
//! optional and a malformed entry only ever costs that entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    common::errors::PlayabilityError,
    protocol::tracks::TrackCandidate,
    sources::youtube::utils::extract_video_id,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    HlsManifest,
    DashManifest,
    ProgressiveFormat,
    AdaptiveAudioFormat,
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::HlsManifest => "hls",
            Self::DashManifest => "dash",
            Self::ProgressiveFormat => "progressive",
            Self::AdaptiveAudioFormat => "adaptive-audio",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCandidate {
    pub url: String,
    pub kind: StreamKind,
    pub bitrate: Option<u64>,
    /// Only a `signatureCipher`/`cipher` was present; `url` is the
    /// undeciphered base and is not playable.
    pub is_ciphered: bool,
    pub mime_type: Option<String>,
}

impl StreamCandidate {
    fn manifest(url: &str, kind: StreamKind) -> Self {
        Self {
            url: url.to_string(),
            kind,
            bitrate: None,
            is_ciphered: false,
            mime_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayabilityStatus {
    Ok,
    Error { status: String, reason: String },
}

pub fn playability_status(body: &Value) -> PlayabilityStatus {
    // No status block at all is read as playable; the formats decide.
    let Some(block) = body.get("playabilityStatus") else {
        return PlayabilityStatus::Ok;
    };

    let status = block
        .get("status")
        .and_then(|s| s.as_str())
        .unwrap_or("UNKNOWN");
    if status == "OK" {
        return PlayabilityStatus::Ok;
    }

    let reason = block
        .get("reason")
        .and_then(get_text)
        .or_else(|| {
            block
                .get("errorScreen")
                .and_then(|e| e.get("playerErrorMessageRenderer"))
                .and_then(|r| r.get("reason"))
                .and_then(get_text)
        })
        .unwrap_or_else(|| status.to_string());

    PlayabilityStatus::Error {
        status: status.to_string(),
        reason,
    }
}

/// Extracts every playable stream from a `/player` response.
///
/// Manifests come first, then progressive formats in upstream order, then
/// audio-only adaptive formats sorted by bitrate, highest first. Ciphered
/// formats are never returned. An empty list means this response had
/// nothing usable, which is not an error.
pub fn parse_player_response(body: &Value) -> Result<Vec<StreamCandidate>, PlayabilityError> {
    if let PlayabilityStatus::Error { status, reason } = playability_status(body) {
        return Err(PlayabilityError { status, reason });
    }

    let all = collect_streams(body);
    let skipped = all.iter().filter(|c| c.is_ciphered).count();
    if skipped > 0 {
        tracing::debug!("Skipping {} ciphered formats", skipped);
    }

    Ok(all.into_iter().filter(|c| !c.is_ciphered).collect())
}

/// Like [`parse_player_response`] without the status check and with
/// ciphered formats kept.
pub(crate) fn collect_streams(body: &Value) -> Vec<StreamCandidate> {
    let Some(streaming_data) = body.get("streamingData") else {
        return Vec::new();
    };

    let mut candidates = Vec::new();

    if let Some(hls) = non_empty_str(streaming_data.get("hlsManifestUrl")) {
        candidates.push(StreamCandidate::manifest(hls, StreamKind::HlsManifest));
    }
    if let Some(dash) = non_empty_str(streaming_data.get("dashManifestUrl")) {
        candidates.push(StreamCandidate::manifest(dash, StreamKind::DashManifest));
    }

    if let Some(formats) = streaming_data.get("formats").and_then(|f| f.as_array()) {
        candidates.extend(
            formats
                .iter()
                .filter_map(|f| format_candidate(f, StreamKind::ProgressiveFormat)),
        );
    }

    if let Some(adaptive) = streaming_data
        .get("adaptiveFormats")
        .and_then(|f| f.as_array())
    {
        let mut audio: Vec<StreamCandidate> = adaptive
            .iter()
            .filter(|f| {
                f.get("mimeType")
                    .and_then(|m| m.as_str())
                    .is_some_and(|m| m.contains("audio"))
            })
            .filter_map(|f| format_candidate(f, StreamKind::AdaptiveAudioFormat))
            .collect();
        audio.sort_by(|a, b| b.bitrate.unwrap_or(0).cmp(&a.bitrate.unwrap_or(0)));
        candidates.extend(audio);
    }

    candidates
}

fn format_candidate(format: &Value, kind: StreamKind) -> Option<StreamCandidate> {
    let mime_type = format
        .get("mimeType")
        .and_then(|m| m.as_str())
        .map(str::to_string);
    let bitrate = parse_bitrate(format.get("bitrate"));

    if let Some(url) = non_empty_str(format.get("url")) {
        return Some(StreamCandidate {
            url: url.to_string(),
            kind,
            bitrate,
            is_ciphered: false,
            mime_type,
        });
    }

    let cipher = format
        .get("signatureCipher")
        .or_else(|| format.get("cipher"))
        .and_then(|c| c.as_str())?;
    let base_url = decode_signature_cipher(cipher).map(|(url, _)| url)?;

    Some(StreamCandidate {
        url: base_url,
        kind,
        bitrate,
        is_ciphered: true,
        mime_type,
    })
}

/// Splits a `signatureCipher` query string into its (url, signature) parts.
pub fn decode_signature_cipher(cipher_str: &str) -> Option<(String, String)> {
    let mut url = None;
    let mut sig = None;

    for part in cipher_str.split('&') {
        if let Some((k, v)) = part.split_once('=') {
            let decoded = urlencoding::decode(v).ok()?.into_owned();
            match k {
                "url" => url = Some(decoded),
                "s" => sig = Some(decoded),
                _ => {}
            }
        }
    }

    Some((url?, sig?))
}

fn parse_bitrate(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|b| *b >= 0.0).map(|b| b as u64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

/// Picks the candidate to play: HLS, then DASH, then the first progressive
/// format, then the highest-bitrate adaptive audio format.
pub fn select_candidate(candidates: &[StreamCandidate]) -> Option<&StreamCandidate> {
    let playable = || candidates.iter().filter(|c| !c.is_ciphered);
    let first_of = |kind: StreamKind| playable().find(|c| c.kind == kind);

    first_of(StreamKind::HlsManifest)
        .or_else(|| first_of(StreamKind::DashManifest))
        .or_else(|| first_of(StreamKind::ProgressiveFormat))
        .or_else(|| best_audio(candidates))
}

/// Highest-bitrate non-ciphered audio-only candidate.
pub fn best_audio(candidates: &[StreamCandidate]) -> Option<&StreamCandidate> {
    candidates
        .iter()
        .filter(|c| c.kind == StreamKind::AdaptiveAudioFormat && !c.is_ciphered)
        .max_by_key(|c| c.bitrate.unwrap_or(0))
}

/// Parses search results from either the structured item shape
/// (`{"items": [...]}`) or a raw InnerTube search tree.
pub fn parse_search_response(body: &Value) -> Vec<TrackCandidate> {
    if let Some(items) = body.get("items").and_then(|i| i.as_array()) {
        return items.iter().filter_map(structured_item).collect();
    }

    video_renderers(body)
        .into_iter()
        .filter_map(renderer_track)
        .collect()
}

fn structured_item(item: &Value) -> Option<TrackCandidate> {
    let video_id = item
        .get("videoId")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| {
            item.get("url")
                .and_then(|u| u.as_str())
                .map(extract_video_id)
        })
        .filter(|id| !id.is_empty())?;

    let title = non_empty_str(item.get("name")).unwrap_or("Unknown");
    let artist = non_empty_str(item.get("uploaderName")).unwrap_or("Unknown Artist");
    let duration_ms = item
        .get("duration")
        .and_then(|d| d.as_i64())
        .filter(|secs| *secs > 0)
        .and_then(|secs| (secs as u64).checked_mul(1000))
        .unwrap_or(0);

    let thumbnail = item
        .get("thumbnails")
        .and_then(|t| t.as_array())
        .and_then(|arr| arr.first())
        .and_then(|t| t.get("url"))
        .or_else(|| item.get("thumbnailUrl"))
        .and_then(|u| u.as_str());

    Some(TrackCandidate::online(
        video_id,
        title,
        artist,
        duration_ms,
        thumbnail.and_then(normalize_thumbnail),
    ))
}

fn renderer_track(renderer: &Value) -> Option<TrackCandidate> {
    let video_id = non_empty_str(renderer.get("videoId"))?;

    let title = renderer
        .get("title")
        .and_then(get_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let artist = ["ownerText", "longBylineText", "shortBylineText"]
        .iter()
        .find_map(|key| renderer.get(*key).and_then(get_text).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| "Unknown Artist".to_string());

    let duration_ms = renderer
        .get("lengthText")
        .and_then(get_text)
        .map(|text| parse_duration_text(&text))
        .unwrap_or(0);

    let thumbnail = renderer
        .get("thumbnail")
        .and_then(|t| t.get("thumbnails"))
        .and_then(|arr| arr.as_array())
        .and_then(|arr| arr.first())
        .and_then(|t| t.get("url"))
        .and_then(|u| u.as_str());

    Some(TrackCandidate::online(
        video_id,
        title,
        artist,
        duration_ms,
        thumbnail.and_then(normalize_thumbnail),
    ))
}

/// All video renderers of a search tree, in display order.
pub fn video_renderers(tree: &Value) -> Vec<&Value> {
    let Some(section_list) = find_section_list(tree) else {
        return Vec::new();
    };

    section_list
        .get("contents")
        .and_then(|c| c.as_array())
        .into_iter()
        .flatten()
        .filter_map(|section| {
            section
                .get("itemSectionRenderer")
                .and_then(|i| i.get("contents"))
                .and_then(|c| c.as_array())
        })
        .flatten()
        .filter_map(|item| {
            item.get("videoRenderer")
                .or_else(|| item.get("compactVideoRenderer"))
                .or_else(|| {
                    item.get("richItemRenderer")
                        .and_then(|r| r.get("content"))
                        .and_then(|c| c.get("videoRenderer"))
                })
        })
        .collect()
}

pub fn find_section_list(value: &Value) -> Option<&Value> {
    if let Some(list) = value.get("sectionListRenderer") {
        return Some(list);
    }
    if let Some(list) = value.get("contents").and_then(find_section_list) {
        return Some(list);
    }
    if let Some(arr) = value.as_array() {
        if let Some(list) = arr.iter().find_map(find_section_list) {
            return Some(list);
        }
    }
    if let Some(tabs) = value.get("tabs").and_then(|t| t.as_array()) {
        if let Some(list) = tabs
            .iter()
            .filter_map(|tab| tab.get("tabRenderer").and_then(|tr| tr.get("content")))
            .find_map(find_section_list)
        {
            return Some(list);
        }
    }
    value
        .get("twoColumnSearchResultsRenderer")
        .and_then(|t| t.get("primaryContents"))
        .and_then(find_section_list)
}

/// Reads an InnerTube text node: a plain string, `simpleText`, or `runs`.
pub fn get_text(obj: &Value) -> Option<String> {
    if let Some(s) = obj.as_str() {
        return Some(s.to_string());
    }
    if let Some(simple_text) = obj.get("simpleText").and_then(|v| v.as_str()) {
        return Some(simple_text.to_string());
    }
    let runs = obj.get("runs").and_then(|v| v.as_array())?;
    Some(
        runs.iter()
            .filter_map(|run| run.get("text").and_then(|t| t.as_str()))
            .collect(),
    )
}

/// `MM:SS` or `HH:MM:SS` to milliseconds; anything else is 0.
pub fn parse_duration_text(text: &str) -> u64 {
    let parts: Option<Vec<u64>> = text
        .trim()
        .split(':')
        .map(|p| p.trim().parse::<u64>().ok())
        .collect();

    let (h, m, s) = match parts.as_deref() {
        Some(&[m, s]) => (0, m, s),
        Some(&[h, m, s]) => (h, m, s),
        _ => return 0,
    };

    // Absurd values overflow to 0 rather than wrapping.
    h.checked_mul(3600)
        .and_then(|secs| m.checked_mul(60)?.checked_add(secs))
        .and_then(|secs| secs.checked_add(s))
        .and_then(|secs| secs.checked_mul(1000))
        .unwrap_or(0)
}

/// Forces `https://` onto protocol-relative and bare-host thumbnail URLs.
pub fn normalize_thumbnail_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("//") {
        format!("https:{}", url)
    } else if !url.is_empty() && !url.starts_with("http") {
        format!("https://{}", url)
    } else {
        url.to_string()
    }
}

fn normalize_thumbnail(url: &str) -> Option<String> {
    Some(normalize_thumbnail_url(url)).filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::tracks::PlaybackReference;
    use serde_json::json;

    #[test]
    fn test_not_ok_status_returns_playability_error() {
        let body = json!({
            "playabilityStatus": { "status": "LOGIN_REQUIRED", "reason": "Sign in to confirm your age" },
            "streamingData": "garbage"
        });
        assert_eq!(
            parse_player_response(&body),
            Err(PlayabilityError {
                status: "LOGIN_REQUIRED".into(),
                reason: "Sign in to confirm your age".into(),
            })
        );

        let body = json!({ "playabilityStatus": { "status": "UNPLAYABLE" } });
        let err = parse_player_response(&body).unwrap_err();
        assert_eq!(err.reason, "UNPLAYABLE");
    }

    #[test]
    fn test_error_screen_reason() {
        let body = json!({
            "playabilityStatus": {
                "status": "ERROR",
                "errorScreen": { "playerErrorMessageRenderer": { "reason": { "runs": [{ "text": "Video " }, { "text": "unavailable" }] } } }
            }
        });
        assert_eq!(parse_player_response(&body).unwrap_err().reason, "Video unavailable");
    }

    #[test]
    fn test_highest_bitrate_audio_wins() {
        let body = json!({
            "playabilityStatus": { "status": "OK" },
            "streamingData": {
                "adaptiveFormats": [
                    { "mimeType": "audio/mp4", "bitrate": 128000, "url": "A" },
                    { "mimeType": "audio/mp4", "bitrate": 256000, "url": "B" },
                    { "mimeType": "video/mp4", "bitrate": 999999, "url": "C" }
                ]
            }
        });

        let candidates = parse_player_response(&body).unwrap();
        let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["B", "A"]);
        assert!(candidates.iter().all(|c| c.kind == StreamKind::AdaptiveAudioFormat));
        assert_eq!(best_audio(&candidates).map(|c| c.url.as_str()), Some("B"));
        assert_eq!(select_candidate(&candidates).map(|c| c.url.as_str()), Some("B"));
    }

    #[test]
    fn test_ciphered_formats_yield_nothing() {
        let body = json!({
            "playabilityStatus": { "status": "OK" },
            "streamingData": {
                "formats": [
                    { "mimeType": "video/mp4", "signatureCipher": "s=abc&sp=sig&url=https%3A%2F%2Fexample.com%2Fv" }
                ],
                "adaptiveFormats": [
                    { "mimeType": "audio/webm", "bitrate": 160000, "cipher": "s=def&url=https%3A%2F%2Fexample.com%2Fa" }
                ]
            }
        });

        assert_eq!(parse_player_response(&body), Ok(vec![]));

        let raw = collect_streams(&body);
        assert_eq!(raw.len(), 2);
        assert!(raw.iter().all(|c| c.is_ciphered));
        assert_eq!(raw[0].url, "https://example.com/v");
        assert!(select_candidate(&raw).is_none());
    }

    #[test]
    fn test_manifests_and_progressive_order() {
        let body = json!({
            "playabilityStatus": { "status": "OK" },
            "streamingData": {
                "hlsManifestUrl": "https://manifest/hls.m3u8",
                "dashManifestUrl": "https://manifest/dash.mpd",
                "formats": [
                    { "itag": 18, "mimeType": "video/mp4", "signatureCipher": "s=x&url=y" },
                    { "itag": 18, "mimeType": "video/mp4", "url": "https://progressive/18", "bitrate": "500000" }
                ],
                "adaptiveFormats": [
                    { "mimeType": "audio/mp4", "bitrate": 130000, "url": "https://adaptive/140" }
                ]
            }
        });

        let candidates = parse_player_response(&body).unwrap();
        let kinds: Vec<StreamKind> = candidates.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StreamKind::HlsManifest,
                StreamKind::DashManifest,
                StreamKind::ProgressiveFormat,
                StreamKind::AdaptiveAudioFormat,
            ]
        );
        assert_eq!(candidates[2].bitrate, Some(500000));
        assert_eq!(select_candidate(&candidates).unwrap().url, "https://manifest/hls.m3u8");
        assert_eq!(select_candidate(&candidates[1..]).unwrap().url, "https://manifest/dash.mpd");
        assert_eq!(select_candidate(&candidates[2..]).unwrap().url, "https://progressive/18");
    }

    #[test]
    fn test_missing_streaming_data_is_empty_not_error() {
        assert_eq!(parse_player_response(&json!({ "playabilityStatus": { "status": "OK" } })), Ok(vec![]));
        assert_eq!(parse_player_response(&json!({})), Ok(vec![]));
        assert_eq!(parse_player_response(&json!([1, 2, 3])), Ok(vec![]));
    }

    #[test]
    fn test_thumbnail_normalization() {
        assert_eq!(normalize_thumbnail_url("//i.ytimg.com/x.jpg"), "https://i.ytimg.com/x.jpg");
        assert_eq!(normalize_thumbnail_url("https://i.ytimg.com/x.jpg"), "https://i.ytimg.com/x.jpg");
        assert_eq!(normalize_thumbnail_url("i.ytimg.com/x.jpg"), "https://i.ytimg.com/x.jpg");
        assert_eq!(normalize_thumbnail_url(""), "");
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(parse_duration_text("3:45"), 225000);
        assert_eq!(parse_duration_text("1:02:03"), 3723000);
        assert_eq!(parse_duration_text("LIVE"), 0);
        assert_eq!(parse_duration_text(""), 0);
        assert_eq!(parse_duration_text("1:2:3:4"), 0);
        assert_eq!(parse_duration_text("3:x5"), 0);
        assert_eq!(parse_duration_text("99999999999999999:00"), 0);
        assert_eq!(parse_duration_text("18446744073709551615:0:0"), 0);
    }

    #[test]
    fn test_parse_raw_search_tree() {
        let body = json!({
            "contents": { "twoColumnSearchResultsRenderer": { "primaryContents": { "sectionListRenderer": { "contents": [
                { "itemSectionRenderer": { "contents": [
                    { "videoRenderer": {
                        "videoId": "abc123",
                        "title": { "runs": [{ "text": "First Song" }] },
                        "ownerText": { "runs": [{ "text": "Some Channel" }] },
                        "thumbnail": { "thumbnails": [{ "url": "//i.ytimg.com/vi/abc123/default.jpg" }, { "url": "https://big" }] },
                        "lengthText": { "simpleText": "4:05" }
                    } },
                    { "videoRenderer": { "title": { "runs": [{ "text": "No id" }] } } },
                    { "channelRenderer": { "channelId": "UC1" } },
                    { "videoRenderer": {
                        "videoId": "def456",
                        "title": { "simpleText": "Second" },
                        "longBylineText": { "runs": [{ "text": "Byline" }] },
                        "lengthText": { "simpleText": "oops" }
                    } }
                ] } },
                { "continuationItemRenderer": {} }
            ] } } } }
        });

        let tracks = parse_search_response(&body);
        assert_eq!(tracks.len(), 2);

        assert_eq!(tracks[0].title, "First Song");
        assert_eq!(tracks[0].artist, "Some Channel");
        assert_eq!(tracks[0].album, "YouTube");
        assert_eq!(tracks[0].duration_ms, 245000);
        assert_eq!(
            tracks[0].thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/abc123/default.jpg")
        );
        assert_eq!(tracks[0].playback_reference, PlaybackReference::VideoId("abc123".into()));

        assert_eq!(tracks[1].artist, "Byline");
        assert_eq!(tracks[1].duration_ms, 0);
        assert_eq!(tracks[1].thumbnail_url, None);
    }

    #[test]
    fn test_parse_structured_items() {
        let body = json!({ "items": [
            {
                "url": "https://www.youtube.com/watch?v=xyz789",
                "name": "Item Song",
                "uploaderName": "Uploader",
                "thumbnails": [{ "url": "i.ytimg.com/vi/xyz789/hq.jpg" }],
                "duration": 225
            },
            { "name": "broken", "duration": "NaN" },
            { "url": "https://www.youtube.com/watch?v=live01", "duration": -1 },
            { "url": "https://www.youtube.com/watch?v=huge01", "duration": i64::MAX }
        ] });

        let tracks = parse_search_response(&body);
        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].playback_reference.as_str(), "xyz789");
        assert_eq!(tracks[0].duration_ms, 225000);
        assert_eq!(tracks[0].thumbnail_url.as_deref(), Some("https://i.ytimg.com/vi/xyz789/hq.jpg"));
        assert_eq!(tracks[1].title, "Unknown");
        assert_eq!(tracks[1].artist, "Unknown Artist");
        assert_eq!(tracks[1].duration_ms, 0);
        assert_eq!(tracks[2].duration_ms, 0);
    }

    #[test]
    fn test_unrelated_search_shapes_yield_nothing() {
        assert!(parse_search_response(&json!({})).is_empty());
        assert!(parse_search_response(&json!({ "contents": 5 })).is_empty());
        assert!(parse_search_response(&json!(null)).is_empty());
    }

    #[test]
    fn test_decode_signature_cipher() {
        assert_eq!(
            decode_signature_cipher("s=AB%3DC&sp=sig&url=https%3A%2F%2Fr1.googlevideo.com%2Fvideoplayback%3Fid%3D1"),
            Some(("https://r1.googlevideo.com/videoplayback?id=1".into(), "AB=C".into()))
        );
        assert_eq!(decode_signature_cipher("sp=sig"), None);
    }
}
