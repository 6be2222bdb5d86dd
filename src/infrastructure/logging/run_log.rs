//! Hierarchical run log module
//!
//! Every scheduling run produces one structured log document: a tree of
//! named context frames, each holding numbered messages, error entries,
//! record dumps and child frames. This module builds that tree during the
//! run and serializes it to the nested JSON wire format of the log store.
//! Messages are mirrored to `tracing` as they are recorded.
//!
//! User feedback is collected separately: a flat list of human-readable
//! strings that survives a mid-run reset and becomes the feedback document.

use chrono::{Local, NaiveDateTime};
use serde_json::{json, Map, Value};
use tracing::{debug, error as trace_error};

/// One entry inside a context frame.
enum Entry {
    Message(String),
    Error(String),
    Records { name: String, rows: Vec<Value> },
    Child { name: String, node: usize },
}

struct Node {
    entries: Vec<Entry>,
}

/// Tree-structured log of one scheduling run
///
/// Frames are entered with [`scoped`](RunLog::scoped) (or the explicit
/// push/pop pair); entering the same frame name twice merges into the
/// existing frame, matching the document layout where frame names are keys.
pub struct RunLog {
    root_name: String,
    timestamp_start: NaiveDateTime,
    nodes: Vec<Node>,
    stack: Vec<usize>,
    feedback: Vec<String>,
}

impl RunLog {
    /// Creates a log with the given root frame name.
    pub fn new(root_name: &str) -> Self {
        Self {
            root_name: sanitize(root_name),
            timestamp_start: Local::now().naive_local(),
            nodes: vec![Node { entries: Vec::new() }],
            stack: vec![0],
            feedback: Vec::new(),
        }
    }

    /// Starts a fresh tree under a new root name. The feedback list is kept:
    /// it spans the whole run regardless of log phases.
    pub fn reset(&mut self, next_root_name: &str) {
        self.root_name = sanitize(next_root_name);
        self.timestamp_start = Local::now().naive_local();
        self.nodes = vec![Node { entries: Vec::new() }];
        self.stack = vec![0];
    }

    /// Records an informational message in the current frame.
    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("{}", message);
        self.current_mut().entries.push(Entry::Message(message));
    }

    /// Records an error message in the current frame.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        trace_error!("{}", message);
        self.current_mut().entries.push(Entry::Error(message));
    }

    /// Appends a user-facing feedback string.
    pub fn feedback(&mut self, message: impl Into<String>) {
        self.feedback.push(message.into());
    }

    /// Dumps a list of records under a named key in the current frame.
    pub fn add_records(&mut self, name: &str, rows: Vec<Value>) {
        self.current_mut().entries.push(Entry::Records {
            name: sanitize(name),
            rows,
        });
    }

    /// Enters a context frame, creating it if this name was not used yet at
    /// the current level.
    pub fn push_context(&mut self, name: &str) {
        let name = sanitize(name);
        let current = *self.stack.last().unwrap_or(&0);
        let existing = self.nodes[current].entries.iter().find_map(|e| match e {
            Entry::Child { name: n, node } if *n == name => Some(*node),
            _ => None,
        });
        let node = match existing {
            Some(node) => node,
            None => {
                self.nodes.push(Node { entries: Vec::new() });
                let node = self.nodes.len() - 1;
                self.nodes[current].entries.push(Entry::Child { name, node });
                node
            }
        };
        self.stack.push(node);
    }

    /// Leaves the current context frame. The root frame is never popped.
    pub fn pop_context(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Runs `f` inside a named context frame.
    pub fn scoped<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        self.push_context(name);
        let result = f(self);
        self.pop_context();
        result
    }

    /// The feedback strings collected so far.
    pub fn feedback_list(&self) -> &[String] {
        &self.feedback
    }

    /// The feedback document: keys `"1".."N"` in collection order plus a
    /// creation timestamp. `None` when no feedback was recorded.
    pub fn feedback_document(&self) -> Option<Value> {
        if self.feedback.is_empty() {
            return None;
        }
        let mut doc = Map::new();
        for (i, message) in self.feedback.iter().enumerate() {
            doc.insert((i + 1).to_string(), Value::String(message.clone()));
        }
        doc.insert(
            "_createdAt".to_string(),
            Value::String(iso(Local::now().naive_local())),
        );
        Some(Value::Object(doc))
    }

    /// Serializes the tree to the run-log wire format.
    pub fn to_document(&self) -> Value {
        json!({
            "name": self.root_name,
            "timestamp_start": iso(self.timestamp_start),
            "timestamp_end": iso(Local::now().naive_local()),
            "steps": self.frame_to_value(0),
            "errors": {},
        })
    }

    fn frame_to_value(&self, node: usize) -> Value {
        let mut map = Map::new();
        let mut counter = 1usize;
        for entry in &self.nodes[node].entries {
            match entry {
                Entry::Message(message) => {
                    map.insert(format!("Log{}", counter), Value::String(message.clone()));
                    counter += 1;
                }
                Entry::Error(message) => {
                    map.insert(counter.to_string(), Value::String(message.clone()));
                    counter += 1;
                }
                Entry::Records { name, rows } => {
                    let mut records = Map::new();
                    for (i, row) in rows.iter().enumerate() {
                        records.insert((i + 1).to_string(), row.clone());
                    }
                    map.insert(name.clone(), Value::Object(records));
                    counter += 1;
                }
                Entry::Child { name, node } => {
                    map.insert(name.clone(), self.frame_to_value(*node));
                }
            }
        }
        Value::Object(map)
    }

    fn current_mut(&mut self) -> &mut Node {
        let current = *self.stack.last().unwrap_or(&0);
        &mut self.nodes[current]
    }
}

/// Frame names become document keys, so key-breaking characters are
/// replaced.
fn sanitize(name: &str) -> String {
    if name.is_empty() {
        return "UnnamedContext".to_string();
    }
    name.replace(['.', '$'], "_")
}

fn iso(moment: NaiveDateTime) -> String {
    moment.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
