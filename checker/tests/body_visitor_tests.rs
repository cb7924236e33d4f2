// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::*;
use std::rc::Rc;
use symtaint::body_visitor::BodyVisitor;
use symtaint::ir::{Condition, Instruction, MethodBody, MethodDescriptor, Program, Statement, Value};
use symtaint::options::Options;
use symtaint::program_visitor::ProgramVisitor;
use symtaint::tag_domain::SMS_BODY;
use symtaint::utils::{JAVA_LANG_STRING, JAVA_LANG_STRING_BUILDER};

fn body(name: &str, statements: Vec<Statement>) -> MethodBody {
    MethodBody {
        method: MethodDescriptor::new("com.example.Receiver", name, &[SMS_MESSAGE], "void"),
        statements,
    }
}

fn invoke(
    result: Option<&Rc<Value>>,
    method: Rc<MethodDescriptor>,
    base: Option<&Rc<Value>>,
    arguments: Vec<Rc<Value>>,
) -> Statement {
    Instruction::Invoke {
        result: result.cloned(),
        method,
        base: base.cloned(),
        arguments,
    }
    .into()
}

fn identity(target: &Rc<Value>, parameter: usize) -> Statement {
    Instruction::Identity {
        target: target.clone(),
        parameter,
    }
    .into()
}

fn ret(value: &Rc<Value>) -> Statement {
    Instruction::Return {
        value: Some(value.clone()),
    }
    .into()
}

#[test]
fn guarded_assignments_are_kept_apart() {
    let r1 = string_local("r1");
    let c1 = Condition("z0 != 0".to_owned());
    let statements = vec![
        Instruction::Assign {
            target: r1.clone(),
            source: string_literal("a"),
        }
        .into(),
        Statement {
            guard: Some(c1.clone()),
            instruction: Instruction::Assign {
                target: r1.clone(),
                source: string_literal("b"),
            },
        },
    ];
    let body = body("choose", statements);
    let options = Options::default();
    let mut program_visitor = ProgramVisitor::new(&options);
    let mut body_visitor = BodyVisitor::new(&mut program_visitor, &body);
    let summary = body_visitor.visit_body();
    assert!(!summary.is_incomplete);

    let contextual_values = body_visitor.current_environment.get(&r1).unwrap();
    let other = Condition("z0 == 0".to_owned());
    let unconditional = contextual_values.get_last_coherent_values(Some(&other)).unwrap();
    assert_eq!(rendered(&unconditional), vec!["a"]);
    let guarded = contextual_values.get_last_coherent_values(Some(&c1)).unwrap();
    assert_eq!(rendered(&guarded), vec!["b"]);
}

#[test]
fn builder_chains_are_folded() {
    let r1 = builder_local("r1");
    let r2 = builder_local("r2");
    let r3 = string_local("r3");
    let statements = vec![
        Instruction::New {
            target: r1.clone(),
            class: JAVA_LANG_STRING_BUILDER.to_owned(),
        }
        .into(),
        invoke(None, builder_method("<init>", &[]), Some(&r1), vec![]),
        invoke(
            Some(&r2),
            builder_method("append", &[JAVA_LANG_STRING]),
            Some(&r1),
            vec![string_literal("ab")],
        ),
        invoke(
            None,
            builder_method("append", &["int"]),
            Some(&r1),
            vec![int_literal(7)],
        ),
        invoke(
            Some(&r3),
            MethodDescriptor::new(JAVA_LANG_STRING_BUILDER, "toString", &[], JAVA_LANG_STRING),
            Some(&r1),
            vec![],
        ),
        ret(&r3),
    ];
    let body = body("build", statements);
    let options = Options::default();
    let mut program_visitor = ProgramVisitor::new(&options);
    let summary = program_visitor.analyze_body(&body);
    let returned: Vec<&str> = summary.return_values.iter().map(|v| v.value.as_str()).collect();
    assert_eq!(returned, vec!["ab7"]);
    assert!(summary.tainted_flows.is_empty());
}

#[test]
fn tainted_arguments_of_unrecognized_calls_are_reported() {
    let r0 = Value::local("r0", SMS_MESSAGE);
    let r1 = string_local("r1");
    let r2 = Value::local("r2", "com.example.Note");
    let statements = vec![
        identity(&r0, 0),
        invoke(Some(&r1), sms_getter("getMessageBody"), Some(&r0), vec![]),
        Instruction::New {
            target: r2.clone(),
            class: "com.example.Note".to_owned(),
        }
        .into(),
        invoke(
            None,
            MethodDescriptor::new("com.example.Note", "<init>", &[JAVA_LANG_STRING], "void"),
            Some(&r2),
            vec![r1.clone()],
        ),
        ret(&r2),
    ];
    let body = body("onReceive", statements);
    let options = Options::default();
    let mut program_visitor = ProgramVisitor::new(&options);
    let mut body_visitor = BodyVisitor::new(&mut program_visitor, &body);
    let summary = body_visitor.visit_body();

    assert_eq!(summary.tainted_flows.len(), 1);
    let flow = &summary.tainted_flows[0];
    assert_eq!(flow.argument, "r1");
    assert_eq!(flow.tags, vec![SMS_BODY.to_owned()]);
    assert_eq!(flow.callee, "<com.example.Note: void <init>(java.lang.String)>");
    assert_eq!(
        flow.method,
        "<com.example.Receiver: void onReceive(android.telephony.SmsMessage)>"
    );

    let note = body_visitor.current_environment.resolve(&r2).unwrap();
    assert_eq!(rendered(&note), vec!["new Note(r0.getMessageBody())"]);
    assert!(note[0].is_object());
    assert!(note[0].contains_tag(SMS_BODY));
    assert_eq!(summary.return_values[0].tags, vec![SMS_BODY.to_owned()]);
}

#[test]
fn malformed_calls_produce_unknown_results() {
    let r1 = string_local("r1");
    let r2 = builder_local("r2");
    let statements = vec![
        invoke(
            Some(&r1),
            MethodDescriptor::new("", "mystery", &[], JAVA_LANG_STRING),
            None,
            vec![],
        ),
        invoke(
            Some(&r2),
            builder_method("append", &[JAVA_LANG_STRING]),
            None,
            vec![string_literal("x")],
        ),
        ret(&r1),
    ];
    let body = body("broken", statements);
    let options = Options::default();
    let mut program_visitor = ProgramVisitor::new(&options);
    let mut body_visitor = BodyVisitor::new(&mut program_visitor, &body);
    let summary = body_visitor.visit_body();
    assert!(!summary.is_incomplete);
    assert_eq!(summary.return_values[0].value, "UNKNOWN(r1)");
    let appended = body_visitor.current_environment.resolve(&r2).unwrap();
    assert_eq!(rendered(&appended), vec!["UNKNOWN(r2)"]);
}

#[test]
fn bodies_stop_when_time_runs_out() {
    let r1 = string_local("r1");
    let statements = vec![
        Instruction::Assign {
            target: r1.clone(),
            source: string_literal("a"),
        }
        .into(),
        ret(&r1),
    ];
    let body = body("slow", statements);
    let options = Options {
        max_analysis_time_for_body: 0,
        ..Options::default()
    };
    let mut program_visitor = ProgramVisitor::new(&options);
    let summary = program_visitor.analyze_body(&body);
    assert!(summary.is_incomplete);
    assert!(summary.return_values.is_empty());
}

#[test]
fn single_method_restricts_the_analysis() {
    let r1 = string_local("r1");
    let program = Program {
        methods: vec![
            body("first", vec![ret(&r1)]),
            body("second", vec![ret(&r1)]),
        ],
    };
    let options = Options {
        single_method: Some("second".to_owned()),
        ..Options::default()
    };
    let mut program_visitor = ProgramVisitor::new(&options);
    let report = program_visitor.analyze_program(&program);
    assert_eq!(report.summaries.len(), 1);
    let summary = report
        .summary_for("<com.example.Receiver: void second(android.telephony.SmsMessage)>")
        .unwrap();
    assert_eq!(summary.return_values[0].value, "return(r1)");

    let options = Options {
        single_method: Some("com.example.Receiver.first".to_owned()),
        ..Options::default()
    };
    let mut program_visitor = ProgramVisitor::new(&options);
    let report = program_visitor.analyze_program(&program);
    assert_eq!(report.summaries.len(), 1);
    assert!(report.summaries[0].method.contains("first"));
}

#[test]
fn collapsed_entries_keep_their_tags() {
    let r0 = Value::local("r0", SMS_MESSAGE);
    let r1 = string_local("r1");
    let statements = vec![
        identity(&r0, 0),
        invoke(Some(&r1), sms_getter("getMessageBody"), Some(&r0), vec![]),
        invoke(
            None,
            MethodDescriptor::new("android.util.Log", "d", &[JAVA_LANG_STRING, JAVA_LANG_STRING], "int"),
            None,
            vec![string_literal("tag"), r1.clone()],
        ),
    ];
    let body = body("limited", statements);
    let options = Options {
        max_values_per_entry: 0,
        ..Options::default()
    };
    let mut program_visitor = ProgramVisitor::new(&options);
    let mut body_visitor = BodyVisitor::new(&mut program_visitor, &body);
    let summary = body_visitor.visit_body();
    let body_values = body_visitor.current_environment.resolve(&r1).unwrap();
    assert_eq!(rendered(&body_values), vec!["UNKNOWN(r1)"]);
    assert!(body_values[0].contains_tag(SMS_BODY));
    assert_eq!(summary.tainted_flows.len(), 1);
    assert_eq!(summary.tainted_flows[0].argument, "r1");
}
