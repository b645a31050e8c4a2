use crate::{FormatError, LogEntry};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

const KEY_TIME: &str = "time";
const KEY_LEVEL: &str = "level";
const KEY_MSG: &str = "msg";

/// Serializes a log entry into the bytes published as the message value.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError>;
}

impl<F> Formatter for F
where
    F: Fn(&LogEntry) -> Result<Vec<u8>, FormatError> + Send + Sync,
{
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        self(entry)
    }
}

/// One JSON object per entry, newline terminated.
///
/// Fields whose names collide with `time`, `level` or `msg` are kept under
/// `fields.<name>` instead of being overwritten.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// chrono strftime pattern; RFC 3339 when unset.
    pub timestamp_format: Option<String>,
    pub disable_timestamp: bool,
    /// Nest all fields under this key instead of placing them at the top level.
    pub data_key: Option<String>,
    pub pretty_print: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        let mut data: Map<String, Value> =
            entry.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        if let Some(key) = self.data_key.as_deref().filter(|k| !k.is_empty()) {
            let mut nested = Map::new();
            nested.insert(key.to_string(), Value::Object(data));
            data = nested;
        }
        prefix_field_clashes(&mut data);

        if !self.disable_timestamp {
            let time = render_time(&entry.time, self.timestamp_format.as_deref())?;
            data.insert(KEY_TIME.into(), Value::String(time));
        }
        data.insert(KEY_MSG.into(), Value::String(entry.message.clone()));
        data.insert(KEY_LEVEL.into(), Value::String(entry.level.as_str().into()));

        let object = Value::Object(data);
        let mut out = if self.pretty_print {
            serde_json::to_vec_pretty(&object)?
        } else {
            serde_json::to_vec(&object)?
        };
        out.push(b'\n');
        Ok(out)
    }
}

/// `key=value` pairs on one line, fields sorted by key.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    pub timestamp_format: Option<String>,
    pub disable_timestamp: bool,
    pub force_quote: bool,
    pub disable_quote: bool,
    pub quote_empty_fields: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    fn needs_quoting(&self, text: &str) -> bool {
        if self.force_quote {
            return true;
        }
        if self.quote_empty_fields && text.is_empty() {
            return true;
        }
        if self.disable_quote {
            return false;
        }
        text.chars().any(|ch| {
            !(ch.is_ascii_alphanumeric() || matches!(ch, '-' | '.' | '_' | '/' | '@' | '^' | '+'))
        })
    }

    fn append_key_value(&self, out: &mut String, key: &str, value: &str) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(key);
        out.push('=');
        if self.needs_quoting(value) {
            push_quoted(out, value);
        } else {
            out.push_str(value);
        }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>, FormatError> {
        let mut data: Map<String, Value> =
            entry.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        prefix_field_clashes(&mut data);
        let mut keys: Vec<&String> = data.keys().collect();
        keys.sort();

        let mut out = String::new();
        if !self.disable_timestamp {
            let time = render_time(&entry.time, self.timestamp_format.as_deref())?;
            self.append_key_value(&mut out, KEY_TIME, &time);
        }
        self.append_key_value(&mut out, KEY_LEVEL, entry.level.as_str());
        if !entry.message.is_empty() {
            self.append_key_value(&mut out, KEY_MSG, &entry.message);
        }
        for key in keys {
            let value = match &data[key.as_str()] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            self.append_key_value(&mut out, key, &value);
        }
        out.push('\n');
        Ok(out.into_bytes())
    }
}

fn prefix_field_clashes(data: &mut Map<String, Value>) {
    for key in [KEY_TIME, KEY_MSG, KEY_LEVEL] {
        if let Some(value) = data.remove(key) {
            data.insert(format!("fields.{key}"), value);
        }
    }
}

/// Appends `text` double-quoted with Go `strconv.Quote` escapes, the form
/// logrus text output uses.
fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            ch if ch.is_ascii_control() => out.push_str(&format!("\\x{:02x}", ch as u32)),
            ch if is_printable(ch) => out.push(ch),
            ch if (ch as u32) < 0x1_0000 => out.push_str(&format!("\\u{:04x}", ch as u32)),
            ch => out.push_str(&format!("\\U{:08x}", ch as u32)),
        }
    }
    out.push('"');
}

fn is_printable(ch: char) -> bool {
    if ch == ' ' {
        return true;
    }
    !(ch.is_control()
        || ch.is_whitespace()
        || matches!(
            ch,
            '\u{ad}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{feff}'
        ))
}

fn render_time(time: &DateTime<Utc>, pattern: Option<&str>) -> Result<String, FormatError> {
    let Some(pattern) = pattern else {
        return Ok(time.to_rfc3339_opts(SecondsFormat::Secs, true));
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::custom(format!("invalid timestamp format '{pattern}'")));
    }
    Ok(time.format_with_items(items.iter()).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use chrono::TimeZone;

    fn entry() -> LogEntry {
        LogEntry::new(Level::Error, "disk full")
            .with_time(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
            .with_field("device", "sda1")
            .with_field("free_bytes", 0)
    }

    #[test]
    fn json_has_logrus_keys() {
        let out = JsonFormatter::new().format(&entry()).unwrap();
        assert_eq!(out.last(), Some(&b'\n'));
        let v: Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["time"], "2024-03-01T12:30:00Z");
        assert_eq!(v["level"], "error");
        assert_eq!(v["msg"], "disk full");
        assert_eq!(v["device"], "sda1");
        assert_eq!(v["free_bytes"], 0);
    }

    #[test]
    fn json_keeps_clashing_fields_under_prefix() {
        let e = entry().with_field("level", "custom").with_field("msg", "shadow");
        let v: Value = serde_json::from_slice(&JsonFormatter::new().format(&e).unwrap()).unwrap();
        assert_eq!(v["level"], "error");
        assert_eq!(v["fields.level"], "custom");
        assert_eq!(v["fields.msg"], "shadow");
    }

    #[test]
    fn json_data_key_nests_fields() {
        let f = JsonFormatter {
            data_key: Some("data".into()),
            disable_timestamp: true,
            ..Default::default()
        };
        let v: Value = serde_json::from_slice(&f.format(&entry()).unwrap()).unwrap();
        assert_eq!(v["data"]["device"], "sda1");
        assert!(v.get("device").is_none());
        assert!(v.get("time").is_none());
    }

    #[test]
    fn custom_timestamp_pattern() {
        let f = JsonFormatter { timestamp_format: Some("%Y/%m/%d".into()), ..Default::default() };
        let v: Value = serde_json::from_slice(&f.format(&entry()).unwrap()).unwrap();
        assert_eq!(v["time"], "2024/03/01");
    }

    #[test]
    fn invalid_timestamp_pattern_is_a_format_error() {
        let f = TextFormatter { timestamp_format: Some("%Q".into()), ..Default::default() };
        assert!(matches!(f.format(&entry()), Err(FormatError::Custom(_))));
    }

    #[test]
    fn text_line_quotes_only_when_needed() {
        let out = String::from_utf8(TextFormatter::new().format(&entry()).unwrap()).unwrap();
        assert_eq!(
            out,
            "time=\"2024-03-01T12:30:00Z\" level=error msg=\"disk full\" device=sda1 free_bytes=0\n"
        );
    }

    #[test]
    fn text_empty_values_and_message() {
        let f = TextFormatter {
            disable_timestamp: true,
            quote_empty_fields: true,
            ..Default::default()
        };
        let e = LogEntry::new(Level::Info, "").with_field("user", "");
        assert_eq!(String::from_utf8(f.format(&e).unwrap()).unwrap(), "level=info user=\"\"\n");
    }

    #[test]
    fn text_quoting_uses_go_escapes() {
        let f = TextFormatter { disable_timestamp: true, ..Default::default() };
        let e = LogEntry::new(Level::Warn, "say \"hi\"\tnow")
            .with_field("ansi", "\u{1b}[31mred")
            .with_field("nbsp", "a\u{a0}b")
            .with_field("path", "C:\\logs")
            .with_field("name", "café au lait");
        let out = String::from_utf8(f.format(&e).unwrap()).unwrap();
        assert_eq!(
            out,
            "level=warn msg=\"say \\\"hi\\\"\\tnow\" ansi=\"\\x1b[31mred\" \
             name=\"café au lait\" nbsp=\"a\\u00a0b\" path=\"C:\\\\logs\"\n"
        );
    }

    #[test]
    fn closures_are_formatters() {
        let f =
            |e: &LogEntry| -> Result<Vec<u8>, FormatError> { Ok(e.message.clone().into_bytes()) };
        assert_eq!(f.format(&entry()).unwrap(), b"disk full");
    }
}
