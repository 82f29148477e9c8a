//! Diagnostics sender — ships real-time render metrics over UDP.
//!
//! Enabled by the `diagnostics` feature flag. The window loop owns an optional
//! [`DiagSender`] and calls [`DiagSender::send`] once per frame; the sender
//! throttles itself to 10 Hz, serializes a JSON snapshot, and sends it to
//! `127.0.0.1:9100`. Failing to bind the socket only disables diagnostics.

use std::net::{ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::clip::{FrameStats, RenderConfig};
use crate::time::Time;

/// Where snapshots go by default.
pub const DIAG_ADDR: &str = "127.0.0.1:9100";

const SEND_INTERVAL: Duration = Duration::from_millis(100);

/// Owns the outbound UDP socket and throttling state.
pub struct DiagSender {
    socket: UdpSocket,
    last_send: Option<Instant>,
}

impl DiagSender {
    /// Bind an ephemeral port and connect to [`DIAG_ADDR`].
    pub fn new() -> Option<Self> {
        Self::connect(DIAG_ADDR)
    }

    pub fn connect(addr: impl ToSocketAddrs) -> Option<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").ok()?;
        socket.connect(addr).ok()?;
        socket.set_nonblocking(true).ok()?;
        Some(Self {
            socket,
            last_send: None,
        })
    }

    /// Send a snapshot if at least 100 ms have passed since the last one.
    /// Returns whether a datagram went out.
    pub fn send(
        &mut self,
        time: &Time,
        config: RenderConfig,
        stats: Option<&FrameStats>,
        last_error: Option<&str>,
    ) -> bool {
        let now = Instant::now();
        if self
            .last_send
            .is_some_and(|last| now.duration_since(last) < SEND_INTERVAL)
        {
            return false;
        }
        self.last_send = Some(now);

        let snapshot = DiagSnapshot {
            fps: time.fps(),
            delta_ms: time.delta_secs() * 1000.0,
            frame_count: time.frame_count(),
            elapsed_secs: time.elapsed_secs(),
            config,
            render: stats.map(|s| RenderStatsSnapshot {
                draw_calls: s.draw_calls,
                program_rebuilds: s.rebuilds,
                overlay_present: s.overlay,
            }),
            last_error,
        };

        match serde_json::to_vec(&snapshot) {
            // Nobody listening is not an error worth reporting.
            Ok(bytes) => self.socket.send(&bytes).is_ok(),
            Err(e) => {
                log::warn!("Failed to serialize diagnostics: {e}");
                false
            }
        }
    }
}

// ── Snapshot types (wire format) ────────────────────────────────────────

#[derive(Serialize)]
struct DiagSnapshot<'a> {
    fps: f32,
    delta_ms: f32,
    frame_count: u64,
    elapsed_secs: f32,
    config: RenderConfig,
    render: Option<RenderStatsSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_error: Option<&'a str>,
}

#[derive(Serialize)]
struct RenderStatsSnapshot {
    draw_calls: u32,
    program_rebuilds: u64,
    overlay_present: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener() -> UdpSocket {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        socket
    }

    #[test]
    fn snapshot_is_json_with_render_stats() {
        let rx = listener();
        let mut sender = DiagSender::connect(rx.local_addr().unwrap()).unwrap();
        let stats = FrameStats {
            draw_calls: 2,
            rebuilds: 3,
            overlay: true,
        };
        let config = RenderConfig {
            clipping: true,
            ..RenderConfig::default()
        };
        assert!(sender.send(&Time::new(), config, Some(&stats), None));

        let mut buf = [0u8; 2048];
        let n = rx.recv(&mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf[..n]).unwrap();
        assert_eq!(value["render"]["draw_calls"], 2);
        assert_eq!(value["render"]["program_rebuilds"], 3);
        assert_eq!(value["render"]["overlay_present"], true);
        assert_eq!(value["config"]["clipping"], true);
        assert_eq!(value["config"]["backFaceCulling"], true);
        assert!(value.get("last_error").is_none());
    }

    #[test]
    fn sends_are_throttled() {
        let rx = listener();
        let mut sender = DiagSender::connect(rx.local_addr().unwrap()).unwrap();
        let time = Time::new();
        assert!(sender.send(&time, RenderConfig::default(), None, None));
        assert!(!sender.send(&time, RenderConfig::default(), None, Some("boom")));
    }
}
