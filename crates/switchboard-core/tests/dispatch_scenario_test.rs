// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::cell::RefCell;
use std::rc::Rc;

use switchboard_core::prelude::*;
use switchboard_core::Category;

type Trace = Rc<RefCell<Vec<String>>>;

// --- Modules: an incrementer that emits a note, and a printer ---

#[derive(Debug, Clone, PartialEq, Message)]
#[message(first(Print), last(Inc))]
struct Note {
    text: String,
}

#[derive(Module)]
#[module(handles(i32, Note))]
struct Inc {
    id: usize,
    trace: Trace,
    #[emitter]
    out: Emitter,
}

impl Inc {
    fn new(id: usize, trace: &Trace) -> Self {
        Self {
            id,
            trace: trace.clone(),
            out: Emitter::new(),
        }
    }
}

impl Handler<i32> for Inc {
    fn process(&self, value: &mut i32) {
        self.trace.borrow_mut().push(format!("Inc{}:int", self.id));
        *value += 1;
        let note = self
            .out
            .emit(Note {
                text: "foo".to_string(),
            })
            .expect("emitter is bound during composition");
        assert_eq!(note.text, "foo");
    }
}

impl Handler<Note> for Inc {
    fn process(&self, _note: &mut Note) {
        self.trace.borrow_mut().push(format!("Inc{}:note", self.id));
    }
}

#[derive(Module)]
#[module(handles(i32, Note))]
struct Print {
    id: usize,
    trace: Trace,
}

impl Print {
    fn new(id: usize, trace: &Trace) -> Self {
        Self {
            id,
            trace: trace.clone(),
        }
    }
}

impl Handler<i32> for Print {
    fn process(&self, _value: &mut i32) {
        self.trace.borrow_mut().push(format!("Print{}:int", self.id));
    }
}

impl Handler<Note> for Print {
    fn process(&self, note: &mut Note) {
        assert_eq!(note.text, "foo");
        self.trace.borrow_mut().push(format!("Print{}:note", self.id));
    }
}

/// A module that accepts none of the scenario's messages.
#[derive(Default, Module)]
#[module(handles(u64))]
struct Bystander {
    calls: std::cell::Cell<u32>,
}

impl Handler<u64> for Bystander {
    fn process(&self, _value: &mut u64) {
        self.calls.set(self.calls.get() + 1);
    }
}
// ---

#[test]
fn test_emission_reenters_with_tag_ordering() {
    // --- 1. Compose [Inc, Print, Inc, Print] ---
    let trace = Trace::default();
    let manager = Manager::new((
        Inc::new(0, &trace),
        Print::new(0, &trace),
        Inc::new(1, &trace),
        Print::new(1, &trace),
    ));

    // --- 2. Dispatch an int ---
    let result = manager.process(5);

    // --- 3. Every capable module ran once per dispatch, notes nested inside ---
    assert_eq!(result, 7);
    let expected = [
        "Inc0:int",
        "Print0:note",
        "Print1:note",
        "Inc0:note",
        "Inc1:note",
        "Print0:int",
        "Inc1:int",
        "Print0:note",
        "Print1:note",
        "Inc0:note",
        "Inc1:note",
        "Print1:int",
    ];
    assert_eq!(*trace.borrow(), expected);
    assert_eq!(manager.depth(), 0);
}

#[test]
fn test_note_order_and_categories() {
    let trace = Trace::default();
    let manager = Manager::new((
        Inc::new(0, &trace),
        Print::new(0, &trace),
        Inc::new(1, &trace),
        Print::new(1, &trace),
    ));

    assert_eq!(manager.dispatch_order::<i32>(), vec![0, 1, 2, 3]);
    assert_eq!(manager.dispatch_order::<Note>(), vec![1, 3, 0, 2]);
    assert_eq!(
        manager.categories::<Note>(),
        vec![
            (1, Category::First),
            (3, Category::First),
            (0, Category::Last),
            (2, Category::Last),
        ]
    );
}

#[test]
fn test_process_mut_returns_the_same_message() {
    let trace = Trace::default();
    let manager = Manager::new((Print::new(0, &trace), Print::new(1, &trace)));

    let mut note = Note {
        text: "foo".to_string(),
    };
    let returned = manager.process_mut(&mut note);

    assert_eq!(returned.text, "foo");
    assert_eq!(*trace.borrow(), ["Print0:note", "Print1:note"]);
}

#[test]
fn test_incapable_module_is_skipped() {
    let trace = Trace::default();
    let manager = Manager::new((
        Inc::new(0, &trace),
        Bystander::default(),
        Print::new(0, &trace),
    ));

    assert!(!manager.can_process::<i32>(1));
    assert!(manager.can_process::<u64>(1));
    assert_eq!(manager.dispatch_order::<i32>(), vec![0, 2]);

    assert_eq!(manager.process(0), 1);

    assert_eq!(manager.modules().1.calls.get(), 0);
    assert_eq!(
        *trace.borrow(),
        ["Inc0:int", "Print0:note", "Inc0:note", "Print0:int"]
    );
}

#[test]
fn test_message_without_capable_module_passes_through() {
    let trace = Trace::default();
    let manager = Manager::new((Print::new(0, &trace), Bystander::default()));

    assert_eq!(manager.process(String::from("untouched")), "untouched");
    assert!(manager.plan::<String>().is_empty());
    assert!(trace.borrow().is_empty());
}

#[test]
fn test_duplicate_instances_are_registered_independently() {
    let trace = Trace::default();
    let manager = Manager::new((Inc::new(0, &trace), Inc::new(1, &trace)));
    let (first, second) = manager.modules();

    let first_handle = first.out.handle().expect("first instance is bound");
    let second_handle = second.out.handle().expect("second instance is bound");

    assert!(first_handle.ptr_eq(second_handle));
    assert!(first_handle.ptr_eq(&manager.handle()));
    assert!(!std::ptr::eq(&first.out, &second.out));
}
