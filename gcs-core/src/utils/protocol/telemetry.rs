//! Telemetry frames echoed back by the robot.
//!
//! A frame is one datagram (or one serial line) of comma-separated text
//! fields. Fields are interpreted by position only:
//!
//! | index | meaning          |
//! |-------|------------------|
//! | 0, 1  | wheel RPMs       |
//! | 2, 3  | wheel load       |
//! | 6     | heading (degrees)|
//!
//! Fields 4 and 5 are carried but not displayed.

/// Field delimiter of the telemetry payload.
pub const DELIMITER: char = ',';

const RPM_FIELDS: (usize, usize) = (0, 1);
const LOAD_FIELDS: (usize, usize) = (2, 3);
const HEADING_FIELD: usize = 6;

/// Reasons a payload is discarded instead of displayed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("telemetry payload is not valid UTF-8")]
    NotUtf8,
    #[error("telemetry frame has {found} fields, expected at least {expected}")]
    TooFewFields { found: usize, expected: usize },
    #[error("telemetry frame of {len} bytes exceeds the {capacity} byte buffer")]
    TooLong { len: usize, capacity: usize },
}

/// One parsed telemetry frame. Lives for a single ingestion iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFrame {
    fields: Vec<String>,
}

impl TelemetryFrame {
    /// Decode `payload` and split it into fields.
    ///
    /// Trailing line endings are stripped so serial lines and datagrams parse
    /// alike. Fails with [`FrameError::TooFewFields`] below `min_fields`.
    pub fn parse(
        payload: &[u8],
        min_fields: usize,
    ) -> Result<Self, FrameError> {
        let text = decode(payload)?;
        let frame = Self::from_text(text);
        if frame.fields.len() < min_fields {
            return Err(FrameError::TooFewFields {
                found: frame.fields.len(),
                expected: min_fields,
            });
        }
        Ok(frame)
    }

    /// Split already-decoded text without any field-count requirement.
    pub fn from_text(text: &str) -> Self {
        TelemetryFrame {
            fields: text
                .trim_end_matches(['\r', '\n'])
                .split(DELIMITER)
                .map(|f| f.trim().to_owned())
                .collect(),
        }
    }

    /// Raw text of the field at `index`.
    pub fn field(
        &self,
        index: usize,
    ) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    fn number(
        &self,
        index: usize,
    ) -> Option<f32> {
        self.field(index)?.parse().ok()
    }

    /// Wheel RPMs (fields 0 and 1).
    pub fn wheel_rpm(&self) -> (Option<f32>, Option<f32>) {
        (self.number(RPM_FIELDS.0), self.number(RPM_FIELDS.1))
    }

    /// Wheel load (fields 2 and 3).
    pub fn load(&self) -> (Option<f32>, Option<f32>) {
        (self.number(LOAD_FIELDS.0), self.number(LOAD_FIELDS.1))
    }

    /// Heading in degrees (field 6).
    pub fn heading(&self) -> Option<f32> {
        self.number(HEADING_FIELD)
    }

    /// Render the single-line status view.
    ///
    /// Fields are shown as received, so non-numeric text is displayed rather
    /// than hidden.
    pub fn status_line(&self) -> String {
        let f = |i| self.field(i).unwrap_or("-");
        format!(
            "[STATUS] RPM: {}|{} | Load: {}|{} | Head: {}°",
            f(RPM_FIELDS.0),
            f(RPM_FIELDS.1),
            f(LOAD_FIELDS.0),
            f(LOAD_FIELDS.1),
            f(HEADING_FIELD),
        )
    }

    /// Render the frame as one JSON object.
    ///
    /// Unparseable numeric fields become `null`; the raw text stays available
    /// under `fields`.
    pub fn to_json(&self) -> String {
        let (rpm_a, rpm_b) = self.wheel_rpm();
        let (load_a, load_b) = self.load();
        serde_json::json!({
            "rpm": [rpm_a, rpm_b],
            "load": [load_a, load_b],
            "heading": self.heading(),
            "fields": &self.fields,
        })
        .to_string()
    }
}

/// Decode a payload as UTF-8 text.
pub fn decode(payload: &[u8]) -> Result<&str, FrameError> {
    core::str::from_utf8(payload).map_err(|_| FrameError::NotUtf8)
}
