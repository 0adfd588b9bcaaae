/*
 * Copyright (C) 2025 The Streamfleet Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::fmt::Write as _;
#[cfg(not(test))]
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

const SERVICE_NAME: &str = "streamfleet";

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogFormat {
    Text = 0,
    Json = 1,
}

static LOG_FORMAT: AtomicU8 = AtomicU8::new(LogFormat::Text as u8);

pub fn set_log_format(format: LogFormat) {
    LOG_FORMAT.store(format as u8, Ordering::Relaxed);
}

pub fn current_log_format() -> LogFormat {
    match LOG_FORMAT.load(Ordering::Relaxed) {
        1 => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WorkerLogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl WorkerLogLevel {
    fn as_str(self) -> &'static str {
        match self {
            WorkerLogLevel::Debug => "DEBUG",
            WorkerLogLevel::Info => "INFO",
            WorkerLogLevel::Warn => "WARN",
            WorkerLogLevel::Error => "ERROR",
        }
    }

    fn is_stderr(self) -> bool {
        matches!(self, WorkerLogLevel::Warn | WorkerLogLevel::Error)
    }
}

fn encode_field_value(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '"' | '\\' | '='));
    if plain {
        return value.to_string();
    }

    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t");
    format!("\"{escaped}\"")
}

fn push_field(buffer: &mut String, key: &str, value: &str) {
    if !buffer.is_empty() {
        buffer.push(' ');
    }
    let _ = write!(buffer, "{key}={}", encode_field_value(value));
}

pub fn log_event(level: WorkerLogLevel, component: &str, message: &str, metadata: &[(&str, &str)]) {
    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let pid = std::process::id().to_string();

    match current_log_format() {
        LogFormat::Text => {
            let mut line = String::new();
            push_field(&mut line, "ts", &timestamp);
            push_field(&mut line, "level", level.as_str());
            push_field(&mut line, "service", SERVICE_NAME);
            push_field(&mut line, "component", component);
            push_field(&mut line, "pid", &pid);
            push_field(&mut line, "msg", message);

            for (key, value) in metadata {
                if key.is_empty() {
                    continue;
                }
                push_field(&mut line, key, value);
            }

            write_line(level, &line);
        }
        LogFormat::Json => {
            let mut payload = serde_json::Map::new();
            payload.insert("ts".into(), Value::String(timestamp));
            payload.insert("level".into(), Value::String(level.as_str().to_string()));
            payload.insert("service".into(), Value::String(SERVICE_NAME.to_string()));
            payload.insert("component".into(), Value::String(component.to_string()));
            payload.insert("pid".into(), Value::String(pid));
            payload.insert("msg".into(), Value::String(message.to_string()));
            for (key, value) in metadata {
                if key.is_empty() {
                    continue;
                }
                payload.insert((*key).to_string(), Value::String((*value).to_string()));
            }
            let line = Value::Object(payload).to_string();
            write_line(level, &line);
        }
    }
}

pub fn log_debug(component: &str, message: &str, metadata: &[(&str, &str)]) {
    log_event(WorkerLogLevel::Debug, component, message, metadata);
}

pub fn log_info(component: &str, message: &str, metadata: &[(&str, &str)]) {
    log_event(WorkerLogLevel::Info, component, message, metadata);
}

pub fn log_warn(component: &str, message: &str, metadata: &[(&str, &str)]) {
    log_event(WorkerLogLevel::Warn, component, message, metadata);
}

pub fn log_error(component: &str, message: &str, metadata: &[(&str, &str)]) {
    log_event(WorkerLogLevel::Error, component, message, metadata);
}

#[cfg(not(test))]
fn write_line(level: WorkerLogLevel, line: &str) {
    let result = if level.is_stderr() {
        writeln!(io::stderr().lock(), "{line}")
    } else {
        writeln!(io::stdout().lock(), "{line}")
    };
    if result.is_err() {
        let _ = writeln!(io::stderr().lock(), "streamfleet: dropped log line: {line}");
    }
}

#[cfg(test)]
fn write_line(level: WorkerLogLevel, line: &str) {
    let store = test_log_store();
    let mut guard = store.lock().unwrap();
    guard.push((level, line.to_string()));
}

#[cfg(test)]
fn test_log_store() -> &'static Mutex<Vec<(WorkerLogLevel, String)>> {
    static STORE: OnceLock<Mutex<Vec<(WorkerLogLevel, String)>>> = OnceLock::new();
    STORE.get_or_init(|| Mutex::new(Vec::new()))
}

#[cfg(test)]
fn take_test_logs() -> Vec<(WorkerLogLevel, String)> {
    let store = test_log_store();
    let mut guard = store.lock().unwrap();
    guard.drain(..).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Tests share the global log store and format flag; serialize them.
    fn test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn text_logs_carry_component_and_metadata() {
        let _guard = test_lock().lock().unwrap();
        set_log_format(LogFormat::Text);
        take_test_logs();
        log_info("cluster-manager", "reconciled", &[("cluster_id", "c1")]);

        let logs = take_test_logs();
        let line = logs
            .iter()
            .map(|(_, l)| l)
            .find(|l| l.contains("component=cluster-manager"))
            .expect("log line for cluster-manager");
        assert!(line.contains("cluster_id=c1"), "metadata missing: {line}");
    }

    #[test]
    fn field_values_with_spaces_are_quoted_and_escaped() {
        let _guard = test_lock().lock().unwrap();
        set_log_format(LogFormat::Text);
        take_test_logs();
        log_error(
            "cluster-manager",
            "reconcile failed",
            &[("error", "remote call \"x\" failed")],
        );

        let logs = take_test_logs();
        let line = &logs[0].1;
        assert!(
            line.contains("error=\"remote call \\\"x\\\" failed\""),
            "line: {line}"
        );
        assert!(line.contains("msg=\"reconcile failed\""), "line: {line}");
    }

    #[test]
    fn json_logs_are_valid_objects() {
        let _guard = test_lock().lock().unwrap();
        set_log_format(LogFormat::Json);
        take_test_logs();
        log_warn("scaling", "no capacity", &[("region", "us-east-1")]);

        let logs = take_test_logs();
        let line = logs
            .iter()
            .map(|(_, l)| l)
            .find(|l| l.contains("\"component\":\"scaling\""))
            .expect("json log line for scaling");
        let payload: Value = serde_json::from_str(line).expect("valid json log");
        assert_eq!(
            payload.get("region").and_then(|v| v.as_str()),
            Some("us-east-1")
        );
        set_log_format(LogFormat::Text);
    }
}
