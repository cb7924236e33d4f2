// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::*;
use std::rc::Rc;
use symtaint::constant_domain::ConstantDomain;
use symtaint::environment::{ContextualValues, Environment};
use symtaint::ir::{BinaryOperator, Condition, Value};
use symtaint::symbolic_value::SymbolicValue;
use symtaint::tag_domain::{SMS_BODY, SMS_SENDER};
use symtaint::tag_propagation::{propagate_tags, propagate_tags_to_all};

fn int(i: i64) -> Rc<SymbolicValue> {
    Rc::new(SymbolicValue::make_constant(ConstantDomain::I64(i)))
}

#[test]
fn unrecorded_values_resolve_to_nothing() {
    let environment = Environment::default();
    let r1 = string_local("r1");
    assert!(environment.get(&r1).is_none());
    assert!(environment.resolve(&r1).is_none());
    assert!(environment.tags_of(&r1).is_empty());
    assert!(environment.is_empty());
}

#[test]
fn literals_resolve_to_constants() {
    let environment = Environment::default();
    let values = environment.resolve_operand(&string_literal("x")).unwrap();
    assert_eq!(rendered(&values), vec!["x"]);
    assert!(environment.resolve(&string_literal("x")).is_none());
}

#[test]
fn lookups_fall_back_to_the_canonical_form() {
    let mut environment = Environment::default();
    let as_object = Value::local("r1", "java.lang.Object");
    let as_string = string_local("r1");
    assert_ne!(as_object, as_string);
    environment.update_value_at(as_object, vec![constant("abc")], None);
    let values = environment.resolve(&as_string).unwrap();
    assert_eq!(rendered(&values), vec!["abc"]);
    assert_eq!(environment.len(), 1);
}

#[test]
fn the_most_recent_coherent_values_are_returned() {
    let mut environment = Environment::default();
    let r1 = string_local("r1");
    let c1 = Condition("i0 > 0".to_owned());
    let c2 = Condition("i0 <= 0".to_owned());
    environment.update_value_at(r1.clone(), vec![constant("a")], None);
    environment.update_value_at(r1.clone(), vec![constant("b")], Some(c1.clone()));

    let contextual_values = environment.get(&r1).unwrap();
    assert_eq!(contextual_values.len(), 2);
    let latest = contextual_values.get_last_coherent_values(None).unwrap();
    assert_eq!(rendered(&latest), vec!["b"]);
    let under_c1 = contextual_values.get_last_coherent_values(Some(&c1)).unwrap();
    assert_eq!(rendered(&under_c1), vec!["b"]);
    let under_c2 = contextual_values.get_last_coherent_values(Some(&c2)).unwrap();
    assert_eq!(rendered(&under_c2), vec!["a"]);
}

#[test]
fn conditional_entries_alone_are_not_coherent_with_other_conditions() {
    let c1 = Condition("c1".to_owned());
    let c2 = Condition("c2".to_owned());
    let contextual_values = ContextualValues::new(Some(c1.clone()), Rc::new(vec![constant("a")]));
    assert!(contextual_values.get_last_coherent_values(Some(&c2)).is_none());
    assert!(contextual_values.get_last_coherent_values(Some(&c1)).is_some());
    assert!(contextual_values.get_last_coherent_values(None).is_some());
}

#[test]
fn too_many_values_collapse_into_a_tagged_unknown() {
    let mut environment = Environment::new(2);
    let r1 = string_local("r1");
    let values = vec![
        constant("a"),
        tagged_unknown(&r1, SMS_SENDER),
        tagged_unknown(&r1, SMS_BODY),
    ];
    environment.update_value_at(r1.clone(), values, None);
    let values = environment.resolve(&r1).unwrap();
    assert_eq!(values.len(), 1);
    assert!(values[0].is_unknown());
    assert_eq!(values[0].get_value(), "UNKNOWN(r1)");
    assert_eq!(
        values[0].get_string_tags(),
        vec![SMS_SENDER.to_owned(), SMS_BODY.to_owned()]
    );
}

#[test]
fn values_within_the_limit_are_kept() {
    let mut environment = Environment::new(2);
    let r1 = string_local("r1");
    environment.update_value_at(r1.clone(), vec![constant("a"), constant("b")], None);
    assert_eq!(rendered(&environment.resolve(&r1).unwrap()), vec!["a", "b"]);
}

#[test]
fn tags_of_joins_the_tags_of_all_values() {
    let mut environment = Environment::default();
    let r1 = string_local("r1");
    environment.update_value_at(
        r1.clone(),
        vec![tagged_unknown(&r1, SMS_BODY), tagged_unknown(&r1, SMS_SENDER)],
        None,
    );
    let tags = environment.tags_of(&r1);
    assert_eq!(tags.len(), 2);
    assert!(tags.has_tag(SMS_BODY));
    assert!(tags.has_tag(SMS_SENDER));
}

#[test]
fn snapshots_do_not_follow_later_updates() {
    let mut environment = Environment::default();
    let r1 = Value::local("r1", "int");
    let r2 = Value::local("r2", "int");
    environment.update_value_at(r1.clone(), vec![int(1)], None);
    environment.update_value_at(r2.clone(), vec![int(2)], None);
    let sum = SymbolicValue::make_binary(&r1, BinaryOperator::Add, &r2, &environment);
    assert_eq!(sum.get_value(), "1 + 2");

    environment.update_value_at(r1.clone(), vec![int(5)], None);
    assert_eq!(sum.get_value(), "1 + 2");
    let later_sum = SymbolicValue::make_binary(&r1, BinaryOperator::Add, &r2, &environment);
    assert_eq!(later_sum.get_value(), "5 + 2");
}

#[test]
fn propagation_only_adds_tags() {
    let mut environment = Environment::default();
    let r1 = string_local("r1");
    let r2 = string_local("r2");
    environment.update_value_at(r1.clone(), vec![tagged_unknown(&r1, SMS_BODY)], None);
    environment.update_value_at(r2.clone(), vec![tagged_unknown(&r2, SMS_BODY)], None);

    let mut destination = SymbolicValue::make_unknown();
    destination.add_tag(SMS_SENDER);
    propagate_tags(&r1, &mut destination, &environment);
    propagate_tags(&r2, &mut destination, &environment);
    assert_eq!(
        destination.get_string_tags(),
        vec![SMS_SENDER.to_owned(), SMS_BODY.to_owned()]
    );

    let mut destinations = vec![
        SymbolicValue::make_unknown(),
        SymbolicValue::make_constant(ConstantDomain::for_str("x")),
    ];
    propagate_tags_to_all(&r1, &mut destinations, &environment);
    assert!(destinations.iter().all(|d| d.contains_tag(SMS_BODY)));

    let unrecorded = string_local("r9");
    let mut untouched = SymbolicValue::make_unknown();
    propagate_tags(&unrecorded, &mut untouched, &environment);
    assert!(!untouched.has_tag());
}
