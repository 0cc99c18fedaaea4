//! Line-delimited JSON transport for notifications
//!
//! Each notification becomes one event packet:
//!
//! ```text
//! {"Type":"event","Seq":1,"Event":"ProjectChanged","Subject":"/src/App/App.csproj","Body":{"MsBuild":{...}}}
//! ```
//!
//! `Body` is `null` for `ProjectRemoved`.

use parking_lot::Mutex;
use projrelay_core::{NotificationPayload, NotificationSink, ProjectInfoBundle, SinkError};
use serde::Serialize;
use std::borrow::Cow;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct EventPacket<'a> {
    #[serde(rename = "Type")]
    packet_type: &'static str,
    seq: u64,
    event: &'static str,
    subject: Cow<'a, str>,
    body: Option<&'a ProjectInfoBundle>,
}

/// Writes one JSON packet per line to `W`
pub struct JsonLineSink<W: Write + Send> {
    writer: Mutex<W>,
    /// Next packet sequence number
    seq: AtomicU64,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            seq: AtomicU64::new(1),
        }
    }

    /// Consume the sink and return the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLineSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> NotificationSink for JsonLineSink<W> {
    fn emit(&self, notification: &NotificationPayload) -> Result<(), SinkError> {
        let mut writer = self.writer.lock();

        // Sequence is taken under the writer lock so lines appear in order
        let packet = EventPacket {
            packet_type: "event",
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            event: notification.event_type(),
            subject: notification.subject().to_string_lossy(),
            body: notification.body(),
        };

        let line = serde_json::to_string(&packet)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
