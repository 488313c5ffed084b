//! Shared fixtures for `argmap_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::Arc;

use argmap_core::{ArgSpan, CollectionSetting, Schema, Setting};

// ─── Flat target ─────────────────────────────────────────────────────────────

/// One field per supported setting kind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TestClass {
    pub string_value: String,
    pub int_value: i32,
    pub bool_value: bool,
    pub flag_value: bool,
    pub flag_value2: bool,
    pub ulong_value: u64,
    pub collection_strings: Vec<String>,
}

/// Schema over [`TestClass`]; `flag_group` puts both flags in group 1.
#[allow(dead_code)]
pub fn test_schema(flag_group: bool) -> Schema<TestClass> {
    let mut flag = Setting::new(["FlagValue"], |t: &mut TestClass| &mut t.flag_value).flag();
    let mut flag2 = Setting::new(["FlagValue2"], |t: &mut TestClass| &mut t.flag_value2).flag();
    if flag_group {
        flag = flag.group(1);
        flag2 = flag2.group(1);
    }

    let mut schema = Schema::new();
    schema
        .add(Setting::new(["StringValue"], |t: &mut TestClass| &mut t.string_value))
        .unwrap();
    schema
        .add(Setting::new(["IntValue"], |t: &mut TestClass| &mut t.int_value))
        .unwrap();
    schema
        .add(Setting::new(["BoolValue"], |t: &mut TestClass| &mut t.bool_value))
        .unwrap();
    schema.add(flag).unwrap();
    schema.add(flag2).unwrap();
    schema
        .add(Setting::new(["UlongValue"], |t: &mut TestClass| &mut t.ulong_value))
        .unwrap();
    schema
        .add(CollectionSetting::new(["CollectionStrings"], |t: &mut TestClass| {
            &mut t.collection_strings
        }))
        .unwrap();
    schema
}

// ─── Nested targets ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Child {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Parent {
    pub child: Child,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Grandparent {
    pub parent: Parent,
    pub text: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct GreatGrandparent {
    pub grandparent: Grandparent,
    pub grandparent2: Grandparent,
    pub number: i32,
    pub stringy: String,
}

#[allow(dead_code)]
pub fn child_schema() -> Arc<Schema<Child>> {
    let schema = Schema::new()
        .with(Setting::new(["Name"], |c: &mut Child| &mut c.name))
        .and_then(|s| s.with(Setting::new(["Text"], |c: &mut Child| &mut c.text)))
        .unwrap();
    Arc::new(schema)
}

#[allow(dead_code)]
pub fn parent_schema() -> Arc<Schema<Parent>> {
    let child = Schema::nested_parser(&child_schema());
    let schema = Schema::new()
        .with(Setting::with_parser(["Child"], |p: &mut Parent| &mut p.child, child))
        .unwrap();
    Arc::new(schema)
}

#[allow(dead_code)]
pub fn grandparent_schema() -> Arc<Schema<Grandparent>> {
    let parent = Schema::nested_parser(&parent_schema());
    let schema = Schema::new()
        .with(Setting::with_parser(["Parent"], |g: &mut Grandparent| &mut g.parent, parent))
        .and_then(|s| s.with(Setting::new(["Text"], |g: &mut Grandparent| &mut g.text)))
        .unwrap();
    Arc::new(schema)
}

#[allow(dead_code)]
pub fn great_grandparent_schema() -> Arc<Schema<GreatGrandparent>> {
    let grandparent = Schema::nested_parser(&grandparent_schema());
    let schema = Schema::new()
        .with(Setting::with_parser(
            ["Grandparent"],
            |g: &mut GreatGrandparent| &mut g.grandparent,
            Arc::clone(&grandparent),
        ))
        .and_then(|s| {
            s.with(Setting::with_parser(
                ["Grandparent2"],
                |g: &mut GreatGrandparent| &mut g.grandparent2,
                grandparent,
            ))
        })
        .and_then(|s| s.with(Setting::new(["Number"], |g: &mut GreatGrandparent| &mut g.number)))
        .and_then(|s| s.with(Setting::new(["Stringy"], |g: &mut GreatGrandparent| &mut g.stringy)))
        .unwrap();
    Arc::new(schema)
}

// ─── Quote chaos inputs ──────────────────────────────────────────────────────

/// A parent whose child's name is itself a quoted argument string.
#[allow(dead_code)]
pub fn first_str() -> String {
    r#"-Child "-Name "-Name \"Test Value\"" -Text TestText""#.to_string()
}

/// [`first_str`] wrapped one level deeper.
#[allow(dead_code)]
pub fn second_str() -> String {
    format!(r#"-Parent "{}" -Text Dog"#, first_str())
}

/// [`second_str`] twice, next to plain settings.
#[allow(dead_code)]
pub fn third_str() -> String {
    let second = second_str();
    format!(r#"-Stringy "Space Value" -Grandparent2 "{second}" -Grandparent "{second}" -Number 1"#)
}

// ─── Span helpers ────────────────────────────────────────────────────────────

/// Text of every span, in order.
#[allow(dead_code)]
pub fn texts<'a>(spans: &[ArgSpan<'a>]) -> Vec<&'a str> {
    spans.iter().map(|s| s.text).collect()
}
