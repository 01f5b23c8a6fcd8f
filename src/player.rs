// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::config::PlayerConfig;
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Shown on the playback surface whenever the stream cannot be played.
pub const STREAM_ERROR: &str = "Failed to load the stream. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    LoadStarted,
    ReadyForDisplay,
    Error(String),
}

/// What the user sees around the video: a loading indicator or an error.
#[derive(Debug, Clone)]
pub struct PlaybackSurface {
    channel_name: String,
    loading: bool,
    error: Option<&'static str>,
}

impl PlaybackSurface {
    pub fn new(channel_name: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            loading: true,
            error: None,
        }
    }

    pub fn handle(&mut self, event: &PlaybackEvent) {
        match event {
            PlaybackEvent::LoadStarted => {
                self.loading = true;
                self.error = None;
            }
            PlaybackEvent::ReadyForDisplay => {
                self.loading = false;
            }
            PlaybackEvent::Error(cause) => {
                error!("Video error on {}: {}", self.channel_name, cause);
                self.error = Some(STREAM_ERROR);
                self.loading = false;
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    pub fn status_line(&self) -> String {
        if let Some(message) = self.error {
            message.to_string()
        } else if self.loading {
            format!("Loading {}...", self.channel_name)
        } else {
            format!("Playing {}", self.channel_name)
        }
    }
}

/// Hands streams to an external player process and reports its lifecycle.
#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    pub fn is_available(&self) -> bool {
        std::process::Command::new(&self.config.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Play `url` until the player exits. Every outcome is delivered as a
    /// [`PlaybackEvent`]; nothing is retried.
    pub async fn play(&self, url: &str, events: mpsc::UnboundedSender<PlaybackEvent>) {
        let _ = events.send(PlaybackEvent::LoadStarted);

        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!("Starting player: {} {}", self.config.command, url);
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let _ = events.send(PlaybackEvent::Error(format!(
                    "Failed to start {}: {}",
                    self.config.command, e
                )));
                return;
            }
        };

        let _ = events.send(PlaybackEvent::ReadyForDisplay);

        match child.wait().await {
            Ok(status) if status.success() => debug!("Player exited"),
            // mpv uses exit code 4 when the user quits
            Ok(status) if status.code() == Some(4) => debug!("Player quit by user"),
            Ok(status) => {
                let _ = events.send(PlaybackEvent::Error(format!(
                    "Player exited with {}",
                    status
                )));
            }
            Err(e) => {
                let _ = events.send(PlaybackEvent::Error(format!(
                    "Failed waiting for player: {}",
                    e
                )));
            }
        }
    }
}
