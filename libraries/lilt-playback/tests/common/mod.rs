//! Shared fixtures for playback integration tests

#![allow(dead_code)]

use lilt_core::{EmbeddedPicture, ExtractedMetadata, LiltError, MetadataExtractor, SourceFile};
use lilt_playback::{ChannelNotifier, MemoryEngine, Notification, PlayerController};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

static INIT: Once = Once::new();

/// Install a test log subscriber once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// Extractor answering from a fixed table
///
/// Files not in the table yield empty metadata; names in `failing` error and
/// names in `panicking` panic.
/// `delays` holds a sleep per file name to force completion order.
#[derive(Default)]
pub struct ScriptedExtractor {
    pub tags: HashMap<String, ExtractedMetadata>,
    pub failing: HashSet<String>,
    pub panicking: HashSet<String>,
    pub delays: HashMap<String, Duration>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, name: &str, title: Option<&str>, artist: Option<&str>) -> Self {
        let entry = self.tags.entry(name.to_string()).or_default();
        entry.title = title.map(str::to_string);
        entry.artist = artist.map(str::to_string);
        self
    }

    pub fn with_picture(mut self, name: &str, data: &[u8], mime: &str) -> Self {
        self.tags
            .entry(name.to_string())
            .or_default()
            .pictures
            .push(EmbeddedPicture::new(data.to_vec(), mime));
        self
    }

    pub fn with_duration(mut self, name: &str, duration: Duration) -> Self {
        self.tags.entry(name.to_string()).or_default().duration = Some(duration);
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn panicking(mut self, name: &str) -> Self {
        self.panicking.insert(name.to_string());
        self
    }

    pub fn delayed(mut self, name: &str, delay: Duration) -> Self {
        self.delays.insert(name.to_string(), delay);
        self
    }
}

impl MetadataExtractor for ScriptedExtractor {
    fn extract(&self, name: &str, _data: &[u8]) -> lilt_core::Result<ExtractedMetadata> {
        if let Some(delay) = self.delays.get(name) {
            std::thread::sleep(*delay);
        }
        if self.panicking.contains(name) {
            panic!("malformed frame in {}", name);
        }
        if self.failing.contains(name) {
            return Err(LiltError::metadata(format!("cannot parse {}", name)));
        }
        Ok(self.tags.get(name).cloned().unwrap_or_default())
    }
}

pub fn source_files(names: &[&str]) -> Vec<SourceFile> {
    names
        .iter()
        .map(|name| SourceFile::new(*name, name.as_bytes().to_vec()))
        .collect()
}

pub struct Harness {
    pub controller: PlayerController,
    pub engine: MemoryEngine,
    pub notifications: UnboundedReceiver<Notification>,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let engine = MemoryEngine::new();
        let (notifier, notifications) = ChannelNotifier::new();
        let controller =
            PlayerController::with_defaults(Box::new(engine.clone()), Arc::new(notifier));
        Self {
            controller,
            engine,
            notifications,
        }
    }

    /// Harness with `names` already ingested, no track active
    pub fn with_tracks(names: &[&str]) -> Self {
        let mut harness = Self::new();
        harness
            .controller
            .ingest(&source_files(names), &ScriptedExtractor::new());
        harness.drain();
        harness
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = self.notifications.try_recv() {
            out.push(n);
        }
        out
    }

    pub fn active_title(&self) -> Option<String> {
        self.controller.active_entry().map(|e| e.title.clone())
    }

    pub fn id_of(&self, title: &str) -> lilt_core::EntryId {
        self.controller
            .playlist()
            .iter()
            .find(|e| e.title == title)
            .map(|e| e.id.clone())
            .expect("entry with title")
    }
}
