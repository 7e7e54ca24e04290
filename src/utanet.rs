//! uta-net.com catalogue client.
//!
//! uta-net has no public API, so this client works the public HTML pages:
//! the search form for artist and song lookups, the artist pages for the
//! full song listing and the song pages for the lyric text.  The regions
//! involved are shallow and stable (one table body per listing, one div
//! for the lyrics), so extraction is a handful of regexes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalogue::{CatalogueEntry, CatalogueError, CatalogueSource};
use crate::rate_limiter::RateLimiter;

pub const BASE_URL: &str = "https://www.uta-net.com";
pub const DEFAULT_USER_AGENT: &str = "UtaTag/0.1 (https://github.com/hifiberry/utatag)";
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;

// ── Page patterns ────────────────────────────────────────────────

static LISTING_BODY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<tbody[^>]*class="[^"]*songlist-table-body[^"]*"[^>]*>(.*?)</tbody>"#)
        .unwrap()
});
static ROW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").unwrap());
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<a[^>]+href="([^"]+)"[^>]*>(.*?)</a>"#).unwrap());
static ARTIST_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<span[^>]*class="[^"]*fw-bold[^"]*"[^>]*>(.*?)</span>"#).unwrap());
static SONG_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span[^>]*class="[^"]*song-count[^"]*"[^>]*>(.*?)</span>"#).unwrap()
});
static SONG_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<span[^>]*class="[^"]*songlist-title[^"]*"[^>]*>(.*?)</span>"#).unwrap()
});
static PAGE_COUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"全(\d+)ページ中").unwrap());
static LYRICS_BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div[^>]*id="kashi_area"[^>]*>(.*?)</div>"#).unwrap());
static BR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static HTML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").unwrap());
static MULTI_NEWLINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());
static ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(?:#(\d+)|#[xX]([0-9a-fA-F]+)|([a-zA-Z]+));").unwrap());
static ARTIST_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://www\.uta-net\.com/artist/\d+/?$").unwrap());

// ── Client ───────────────────────────────────────────────────────

/// Blocking uta-net client.  Owns the rate limiter so every page fetch
/// in a run shares one pacing state.
pub struct UtaNetClient {
    user_agent: String,
    limiter: RateLimiter,
}

impl UtaNetClient {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_USER_AGENT, DEFAULT_REQUEST_DELAY_MS)
    }

    pub fn with_settings(user_agent: &str, request_delay_ms: u64) -> Self {
        UtaNetClient {
            user_agent: user_agent.to_string(),
            limiter: RateLimiter::from_millis("uta-net", request_delay_ms),
        }
    }

    fn get(&mut self, url: &str) -> Result<String, CatalogueError> {
        self.limiter.wait_if_needed();
        let response = ureq::get(url).set("User-Agent", &self.user_agent).call();
        match response {
            Ok(resp) => match resp.into_string() {
                Ok(body) => {
                    self.limiter.report_success();
                    Ok(body)
                }
                Err(e) => {
                    self.limiter.report_failure();
                    Err(CatalogueError::Transport(e.to_string()))
                }
            },
            // The server answered, so this is not a pacing problem.
            Err(ureq::Error::Status(404, _)) => {
                self.limiter.report_success();
                Err(CatalogueError::NotFound)
            }
            Err(ureq::Error::Status(code, _)) => {
                self.limiter.report_failure();
                Err(CatalogueError::Status(code))
            }
            Err(e) => {
                self.limiter.report_failure();
                Err(CatalogueError::Transport(e.to_string()))
            }
        }
    }
}

impl Default for UtaNetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogueSource for UtaNetClient {
    fn name(&self) -> &str {
        "uta-net"
    }

    fn search_artists(&mut self, term: &str) -> Result<Vec<CatalogueEntry>, CatalogueError> {
        let url = format!(
            "{}/search/?target=art&type=in&keyword={}",
            BASE_URL,
            urlencoded(term)
        );
        let body = self.get(&url)?;
        Ok(parse_artist_rows(&body))
    }

    fn search_songs(&mut self, term: &str) -> Result<Vec<CatalogueEntry>, CatalogueError> {
        let url = format!(
            "{}/search/?target=song&type=in&keyword={}",
            BASE_URL,
            urlencoded(term)
        );
        let body = self.get(&url)?;
        Ok(parse_song_rows(&body))
    }

    fn song_entries(&mut self, artist_url: &str) -> Result<Vec<(String, String)>, CatalogueError> {
        let first = self.get(artist_url)?;
        let total = page_count(&first);
        let mut songs: Vec<(String, String)> = Vec::new();
        collect_listing(&first, &mut songs);
        for page in 2..=total {
            let page_url = format!("{}/0/{}/", artist_url.trim_end_matches('/'), page);
            let body = self.get(&page_url)?;
            collect_listing(&body, &mut songs);
        }
        Ok(songs)
    }

    fn lyrics(&mut self, song_url: &str) -> Result<String, CatalogueError> {
        let body = self.get(song_url)?;
        Ok(extract_lyrics(&body))
    }
}

// ── Page extraction ──────────────────────────────────────────────

/// Pull artist entries out of a search result page.  Each row carries
/// the artist page link, the display name in a bold span and the song
/// count in its own span.
pub fn parse_artist_rows(html: &str) -> Vec<CatalogueEntry> {
    let mut entries = Vec::new();
    let body = match LISTING_BODY_RE.captures(html).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return entries,
    };
    for row in ROW_RE.captures_iter(body) {
        let row_html = match row.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let link = match LINK_RE.captures(row_html) {
            Some(c) => c,
            None => continue,
        };
        let href = match link.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let inner = match link.get(2) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let name = match ARTIST_NAME_RE.captures(inner) {
            Some(c) => clean_fragment(&c[1]),
            None => continue,
        };
        if name.is_empty() {
            continue;
        }
        let count = match SONG_COUNT_RE.captures(inner) {
            Some(c) => clean_fragment(&c[1]),
            None => String::new(),
        };
        entries.push(CatalogueEntry {
            label: name,
            url: absolute_url(href),
            extra: count,
        });
    }
    entries
}

/// Pull song entries out of a listing page (song search results and
/// artist pages share the table markup).  The first link in a row is
/// the song page, the second one the artist.
pub fn parse_song_rows(html: &str) -> Vec<CatalogueEntry> {
    let mut entries = Vec::new();
    let body = match LISTING_BODY_RE.captures(html).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return entries,
    };
    for row in ROW_RE.captures_iter(body) {
        let row_html = match row.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let title = match SONG_TITLE_RE.captures(row_html) {
            Some(c) => clean_fragment(&c[1]),
            None => continue,
        };
        if title.is_empty() {
            continue;
        }
        let mut links = LINK_RE.captures_iter(row_html);
        let song_link = match links.next() {
            Some(c) => c,
            None => continue,
        };
        let href = match song_link.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let artist = match links.next() {
            Some(c) => clean_fragment(&c[2]),
            None => String::new(),
        };
        entries.push(CatalogueEntry {
            label: title,
            url: absolute_url(href),
            extra: artist,
        });
    }
    entries
}

/// Number of listing pages, from the 全Nページ中 marker.  Single-page
/// listings have no marker.
pub fn page_count(html: &str) -> usize {
    PAGE_COUNT_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Merge one listing page into the accumulated song list.  A title seen
/// again keeps its original position but takes the newer URL.
fn collect_listing(html: &str, songs: &mut Vec<(String, String)>) {
    for entry in parse_song_rows(html) {
        if let Some(pos) = songs.iter().position(|(title, _)| *title == entry.label) {
            songs[pos].1 = entry.url;
        } else {
            songs.push((entry.label, entry.url));
        }
    }
}

/// Extract the lyric text from a song page.  Line breaks come from the
/// <br> tags, runs of blank lines collapse to a single blank line.
pub fn extract_lyrics(html: &str) -> String {
    let body = match LYRICS_BODY_RE.captures(html).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => return String::new(),
    };
    let text = BR_RE.replace_all(body, "\n");
    let text = HTML_TAG_RE.replace_all(&text, "");
    let text = decode_entities(&text).replace('\r', "");
    let text = MULTI_NEWLINE_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Check a user-supplied artist page URL against the expected shape.
pub fn is_artist_url(url: &str) -> bool {
    ARTIST_URL_RE.is_match(url)
}

/// Strip tags from an HTML fragment and decode what remains.
fn clean_fragment(fragment: &str) -> String {
    decode_entities(&HTML_TAG_RE.replace_all(fragment, ""))
        .trim()
        .to_string()
}

/// Decode the handful of entities uta-net pages actually use, plus
/// numeric references.  Unknown entities pass through untouched.
fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures| {
            if let Some(dec) = caps.get(1) {
                return dec
                    .as_str()
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            if let Some(hex) = caps.get(2) {
                return u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
                    .map(String::from)
                    .unwrap_or_else(|| caps[0].to_string());
            }
            match &caps[3] {
                "amp" => "&".to_string(),
                "lt" => "<".to_string(),
                "gt" => ">".to_string(),
                "quot" => "\"".to_string(),
                "apos" => "'".to_string(),
                "nbsp" => " ".to_string(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", BASE_URL, href)
    }
}

/// Percent-encode a query value.  Keywords are mostly Japanese, so
/// everything outside the unreserved set is encoded byte-wise.
fn urlencoded(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for &byte in value.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTIST_SEARCH_PAGE: &str = r#"
<table class="songlist-table">
<tbody class="songlist-table-body">
<tr>
<td class="sp-w-100"><a href="/artist/12795/"><span class="fw-bold">YOASOBI</span>
<span class="song-count">54曲</span></a></td>
</tr>
<tr>
<td class="sp-w-100"><a href="/artist/17598/"><span class="fw-bold">ヨルシカ</span>
<span class="song-count">61曲</span></a></td>
</tr>
</tbody>
</table>"#;

    const SONG_LISTING_PAGE: &str = r#"
<tbody class="songlist-table-body">
<tr>
<td class="sp-w-100"><a href="/song/250113/"><span class="songlist-title">夜に駆ける</span></a></td>
<td class="sp-none"><a href="/artist/12795/">YOASOBI</a></td>
</tr>
<tr>
<td class="sp-w-100"><a href="/song/277593/"><span class="songlist-title">群青</span></a></td>
<td class="sp-none"><a href="/artist/12795/">YOASOBI</a></td>
</tr>
</tbody>"#;

    #[test]
    fn test_parse_artist_rows() {
        let entries = parse_artist_rows(ARTIST_SEARCH_PAGE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "YOASOBI");
        assert_eq!(entries[0].url, "https://www.uta-net.com/artist/12795/");
        assert_eq!(entries[0].extra, "54曲");
        assert_eq!(entries[1].label, "ヨルシカ");
    }

    #[test]
    fn test_parse_artist_rows_without_listing() {
        assert!(parse_artist_rows("<html><body>not found</body></html>").is_empty());
    }

    #[test]
    fn test_parse_song_rows() {
        let entries = parse_song_rows(SONG_LISTING_PAGE);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "夜に駆ける");
        assert_eq!(entries[0].url, "https://www.uta-net.com/song/250113/");
        assert_eq!(entries[0].extra, "YOASOBI");
        assert_eq!(entries[1].label, "群青");
    }

    #[test]
    fn test_parse_song_rows_skips_rows_without_title() {
        let html = r#"<tbody class="songlist-table-body">
<tr><td><a href="/page/2/">次へ</a></td></tr>
</tbody>"#;
        assert!(parse_song_rows(html).is_empty());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count("<div class=\"songlist-pager\">全12ページ中</div>"), 12);
        assert_eq!(page_count("<div>no pager here</div>"), 1);
    }

    #[test]
    fn test_collect_listing_keeps_first_position_takes_last_url() {
        let page_one = r#"<tbody class="songlist-table-body">
<tr><td><a href="/song/1/"><span class="songlist-title">アイドル</span></a></td></tr>
<tr><td><a href="/song/2/"><span class="songlist-title">群青</span></a></td></tr>
</tbody>"#;
        let page_two = r#"<tbody class="songlist-table-body">
<tr><td><a href="/song/9/"><span class="songlist-title">アイドル</span></a></td></tr>
</tbody>"#;
        let mut songs = Vec::new();
        collect_listing(page_one, &mut songs);
        collect_listing(page_two, &mut songs);
        assert_eq!(songs.len(), 2);
        assert_eq!(songs[0].0, "アイドル");
        assert_eq!(songs[0].1, "https://www.uta-net.com/song/9/");
        assert_eq!(songs[1].0, "群青");
    }

    #[test]
    fn test_extract_lyrics() {
        let html = concat!(
            "<html><div id=\"kashi_area\" class=\"p-3\">",
            "騒がしい日々に<br>笑えない君に<br><br><br>",
            "<span>思いつく限り</span>&amp;まばゆい明日を",
            "</div></html>"
        );
        let lyrics = extract_lyrics(html);
        assert_eq!(lyrics, "騒がしい日々に\n笑えない君に\n\n思いつく限り&まばゆい明日を");
    }

    #[test]
    fn test_extract_lyrics_missing_region() {
        assert_eq!(extract_lyrics("<html><body></body></html>"), "");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#39;&#x40;"), "'@");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_urlencoded() {
        assert_eq!(urlencoded("abc-123"), "abc-123");
        assert_eq!(urlencoded("a b"), "a%20b");
        assert_eq!(urlencoded("米津玄師"), "%E7%B1%B3%E6%B4%A5%E7%8E%84%E5%B8%AB");
    }

    #[test]
    fn test_is_artist_url() {
        assert!(is_artist_url("https://www.uta-net.com/artist/12795/"));
        assert!(is_artist_url("http://www.uta-net.com/artist/1"));
        assert!(!is_artist_url("https://www.uta-net.com/song/250113/"));
        assert!(!is_artist_url("https://example.com/artist/12795/"));
        assert!(!is_artist_url("https://www.uta-net.com/artist/12795/extra"));
    }
}
