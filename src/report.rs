//! Structured reporting of experiment and query runs.
//!
//! Values are collected into a JSON document whose nesting roughly follows the
//! call graph, using RAII guards to enter and leave contexts. The finished
//! document is dumped to stdout when the `ReportingGuard` obtained from
//! `enable_reporting` is dropped. When reporting was never enabled, all of
//! this is a no-op, so library code can report unconditionally.
//!
//! Not meant to be used from several threads - each worker gets its own
//! thread local reporter and only the one on the main thread will dump output.

use crate::built_info;
use serde_json::{Map, Value};
use std::{cell::RefCell, mem::swap};

pub use serde_json::json;

#[derive(Debug)]
enum ContextStackItem {
    Key(String),
    Collection(Vec<Value>),
    Object(Map<String, Value>),
}

#[derive(Debug)]
enum CurrentContext {
    Collection(Vec<Value>),
    Object(Map<String, Value>),
}

#[derive(Debug)]
pub struct Reporter {
    current: CurrentContext,
    context_stack: Vec<ContextStackItem>,
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter {
            current: CurrentContext::Object(Map::new()),
            context_stack: Vec::new(),
        }
    }
}

impl Reporter {
    fn create_object_under_key(&mut self, key: String) {
        match &mut self.current {
            CurrentContext::Object(object) => {
                let mut tmp = Map::new();
                swap(&mut tmp, object);
                self.context_stack.push(ContextStackItem::Object(tmp));
                self.context_stack.push(ContextStackItem::Key(key));
            }
            CurrentContext::Collection(_) => panic!("cannot create object at key in collection"),
        }
    }

    fn create_collection_under_key(&mut self, key: String) {
        match &mut self.current {
            CurrentContext::Object(object) => {
                let mut tmp = Map::new();
                swap(&mut tmp, object);
                self.context_stack.push(ContextStackItem::Object(tmp));
                self.context_stack.push(ContextStackItem::Key(key));
                self.current = CurrentContext::Collection(Vec::new());
            }
            CurrentContext::Collection(_) => panic!("cannot create collection at key in collection"),
        }
    }

    fn create_collection_item(&mut self) {
        match &mut self.current {
            CurrentContext::Object(_) => panic!("cannot create collection item in object"),
            CurrentContext::Collection(collection) => {
                let mut tmp = Vec::new();
                swap(&mut tmp, collection);
                self.context_stack.push(ContextStackItem::Collection(tmp));
                self.current = CurrentContext::Object(Map::new());
            }
        }
    }

    fn report(&mut self, key: String, val: Value) {
        match &mut self.current {
            CurrentContext::Object(object) => {
                let prev = object.insert(key, val);
                if !cfg!(feature = "report-allow-override") {
                    assert!(prev.is_none(), "duplicate key reported");
                }
            }
            CurrentContext::Collection(_) => panic!("cannot report value on collection"),
        }
    }

    fn pop_context(&mut self) {
        let parent = self.context_stack.pop().expect("tried to pop from empty context");

        let mut prev_current = CurrentContext::Object(Default::default());
        swap(&mut self.current, &mut prev_current);

        match parent {
            ContextStackItem::Key(key) => {
                let finished = match prev_current {
                    CurrentContext::Object(object) => Value::Object(object),
                    CurrentContext::Collection(collection) => Value::Array(collection),
                };

                if let Some(ContextStackItem::Object(mut object)) = self.context_stack.pop() {
                    let prev = object.insert(key, finished);
                    assert_eq!(prev, None);
                    self.current = CurrentContext::Object(object);
                } else {
                    panic!("inconsistent context stack");
                }
            }
            ContextStackItem::Collection(mut collection) => {
                match prev_current {
                    CurrentContext::Object(object) => collection.push(Value::Object(object)),
                    CurrentContext::Collection(_) => panic!("cannot insert collection into collection"),
                }
                self.current = CurrentContext::Collection(collection);
            }
            ContextStackItem::Object(_) => panic!("inconsistent context stack"),
        }
    }
}

thread_local! {
    static REPORTER: RefCell<Option<Reporter>> = RefCell::new(None);
}

#[must_use]
pub struct ContextGuard(());

impl Drop for ContextGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| reporter.borrow_mut().as_mut().map(Reporter::pop_context));
    }
}

/// All reported values until the guard is dropped go into a nested object under the given key.
pub fn push_context(key: String) -> ContextGuard {
    REPORTER.with(|reporter| reporter.borrow_mut().as_mut().map(|r| r.create_object_under_key(key)));
    ContextGuard(())
}

#[must_use]
pub struct CollectionContextGuard(());

impl Drop for CollectionContextGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| reporter.borrow_mut().as_mut().map(Reporter::pop_context));
    }
}

/// All collection items pushed until the guard is dropped go into a nested array under the given key.
pub fn push_collection_context(key: String) -> CollectionContextGuard {
    REPORTER.with(|reporter| reporter.borrow_mut().as_mut().map(|r| r.create_collection_under_key(key)));
    CollectionContextGuard(())
}

impl CollectionContextGuard {
    pub fn push_collection_item(&mut self) -> CollectionItemContextGuard {
        REPORTER.with(|reporter| reporter.borrow_mut().as_mut().map(Reporter::create_collection_item));
        CollectionItemContextGuard(self)
    }
}

#[must_use]
pub struct CollectionItemContextGuard<'a>(&'a CollectionContextGuard);

impl<'a> Drop for CollectionItemContextGuard<'a> {
    fn drop(&mut self) {
        REPORTER.with(|reporter| reporter.borrow_mut().as_mut().map(Reporter::pop_context));
    }
}

pub fn report(key: String, val: Value) {
    if cfg!(feature = "report-to-stderr") {
        eprintln!("{}: {}", key, val);
    }
    report_silent(key, val)
}

pub fn report_silent(key: String, val: Value) {
    REPORTER.with(|reporter| reporter.borrow_mut().as_mut().map(|r| r.report(key, val)));
}

#[must_use]
pub struct ReportingGuard(());

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTER.with(|reporter| {
            if let Some(r) = reporter.borrow_mut().as_mut() {
                assert!(r.context_stack.is_empty());
                let mut current = CurrentContext::Object(Default::default());
                swap(&mut current, &mut r.current);
                if let CurrentContext::Object(object) = current {
                    println!("{}", Value::Object(object));
                } else {
                    panic!("broken root object for reporting");
                }
            };
        });
    }
}

#[macro_export]
macro_rules! report {
    ($k:expr, $($json:tt)+) => { report($k.to_string(), json!($($json)+)) };
}

/// Turn reporting on for this thread and report a few facts about the binary and its environment.
pub fn enable_reporting(program: &str) -> ReportingGuard {
    REPORTER.with(|reporter| reporter.replace(Some(Reporter::default())));

    report!("build_target", built_info::TARGET);
    report!("build_profile", built_info::PROFILE);
    report!("build_with_rustc", built_info::RUSTC_VERSION);
    report!("crate_version", built_info::PKG_VERSION);

    report!("program", program);
    report!("start_time", format!("{}", time::now_utc().rfc822()));
    report!("args", std::env::args().collect::<Vec<String>>());

    ReportingGuard(())
}

pub mod benchmark;
pub use benchmark::*;
