#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use futures::{StreamExt, stream};
use melo_chat::{
    error::{ChatError, ChatResult},
    message::{Message, StreamRequest},
    services::{
        transport::{BodyStream, Transport},
        widget::Viewport,
    },
};

pub type Log = Arc<Mutex<Vec<String>>>;

#[derive(Clone, Debug)]
pub enum Script {
    /// Serve these reads, then end the body.
    Chunks(Vec<&'static [u8]>),
    /// Answer with a non-success status.
    Refuse(u16),
    /// Serve these reads, then fail the read.
    BreakAfter(Vec<&'static [u8]>),
    /// Serve these reads, then never produce another.
    StallAfter(Vec<&'static [u8]>),
    /// Accept the request but never answer it.
    Silent,
}

pub fn chunks(reads: &[&'static str]) -> Vec<&'static [u8]> {
    reads.iter().map(|s| s.as_bytes()).collect()
}

/// Plays one script per request; the last one repeats.
pub struct ScriptedTransport {
    scripts: Mutex<Vec<Script>>,
    pub requests: Arc<Mutex<Vec<StreamRequest>>>,
    log: Log,
}

impl ScriptedTransport {
    pub fn new(script: Script, log: Log) -> Self {
        Self::sequence(vec![script], log)
    }

    pub fn sequence(scripts: Vec<Script>, log: Log) -> Self {
        Self { scripts: Mutex::new(scripts), requests: Arc::default(), log }
    }

    fn next_script(&self) -> Script {
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.len() > 1 { scripts.remove(0) } else { scripts[0].clone() }
    }
}

impl Transport for ScriptedTransport {
    async fn open(&self, request: &StreamRequest) -> ChatResult<BodyStream> {
        self.log.lock().unwrap().push("open".to_string());
        self.requests.lock().unwrap().push(request.clone());

        let ok = |reads: &Vec<&'static [u8]>| {
            reads
                .iter()
                .map(|r| Ok::<_, ChatError>(r.to_vec()))
                .collect::<Vec<_>>()
        };
        let script = self.next_script();
        if let Script::Silent = script {
            std::future::pending::<()>().await;
        }
        match &script {
            Script::Chunks(reads) => Ok(stream::iter(ok(reads)).boxed()),
            Script::Refuse(status) => Err(ChatError::Connection(format!("server answered {status}"))),
            Script::BreakAfter(reads) => {
                let mut items = ok(reads);
                items.push(Err(ChatError::Stream("connection reset".to_string())));
                Ok(stream::iter(items).boxed())
            }
            Script::StallAfter(reads) => Ok(stream::iter(ok(reads)).chain(stream::pending()).boxed()),
            Script::Silent => unreachable!("silent script never answers"),
        }
    }
}

/// Keeps a snapshot of every render it is asked for.
pub struct RecordingViewport {
    pub snapshots: Arc<Mutex<Vec<Vec<Message>>>>,
    log: Log,
}

impl RecordingViewport {
    pub fn new(log: Log) -> Self {
        Self { snapshots: Arc::default(), log }
    }

    pub fn renders(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }
}

impl Viewport for RecordingViewport {
    fn scroll_to_bottom(&mut self, messages: &[Message]) {
        self.log.lock().unwrap().push(format!("render:{}", messages.len()));
        self.snapshots.lock().unwrap().push(messages.to_vec());
    }
}
