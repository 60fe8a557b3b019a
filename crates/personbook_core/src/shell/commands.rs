//! Built-in command handlers.
//!
//! Every handler receives the full token slice (`tokens[0]` is the command
//! name) after the dispatcher has checked arity.

use super::{CommandError, CommandResult, Flow, Session, MAX_SCRIPT_DEPTH};
use crate::builder::build_person;
use crate::input::{read_record, InputSource, ScriptSource};
use crate::model::person::{HairColor, PersonKey};
use crate::persist::save_collection;
use crate::store::{CollectionStore, KeyDirection};
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

fn require(store: &Option<CollectionStore>) -> Result<&CollectionStore, CommandError> {
    store.as_ref().ok_or(CommandError::Uninitialized)
}

fn require_mut(store: &mut Option<CollectionStore>) -> Result<&mut CollectionStore, CommandError> {
    store.as_mut().ok_or(CommandError::Uninitialized)
}

fn require_non_empty(store: &Option<CollectionStore>) -> Result<&CollectionStore, CommandError> {
    let store = require(store)?;
    if store.is_empty() {
        return Err(CommandError::EmptyCollection);
    }
    Ok(store)
}

fn parse_key(value: &str) -> Result<PersonKey, CommandError> {
    value
        .parse::<PersonKey>()
        .map_err(|_| CommandError::InvalidKey(value.to_string()))
}

/// Parses `tokens[1]` and checks that it names a live entry.
fn existing_key(store: &Option<CollectionStore>, tokens: &[&str]) -> Result<PersonKey, CommandError> {
    let key = parse_key(tokens[1])?;
    if !require(store)?.contains(key) {
        return Err(CommandError::UnknownKey(key));
    }
    Ok(key)
}

fn color_list(colors: &[HairColor]) -> String {
    let names = colors
        .iter()
        .map(|color| color.as_str())
        .collect::<Vec<_>>();
    format!("[{}]", names.join(", "))
}

pub(super) fn help<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    for spec in session.registry.iter() {
        writeln!(session.out, "{}", spec.help_line())?;
    }
    Ok(Flow::Continue)
}

pub(super) fn info<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    let store = require(&session.store)?;
    writeln!(session.out, "Collection type: {}", store.type_tag())?;
    writeln!(session.out, "Created on: {}", store.created_on())?;
    writeln!(session.out, "Number of elements: {}", store.len())?;
    Ok(Flow::Continue)
}

pub(super) fn show<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    let store = require(&session.store)?;
    if store.is_empty() {
        writeln!(session.out, "The collection is empty.")?;
        return Ok(Flow::Continue);
    }
    for (key, person) in store.entries() {
        writeln!(session.out, "key: [{key}] = value: {person}")?;
    }
    Ok(Flow::Continue)
}

pub(super) fn insert<W: Write>(
    session: &mut Session<W>,
    source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    require(&session.store)?;
    let fields = read_record(source, &mut session.out)?;
    let person = build_person(&fields)?;
    let key = require_mut(&mut session.store)?.insert(person);
    writeln!(session.out, "Element added with key {key}.")?;
    Ok(Flow::Continue)
}

pub(super) fn update<W: Write>(
    session: &mut Session<W>,
    source: &mut dyn InputSource,
    tokens: &[&str],
) -> CommandResult {
    let key = existing_key(&session.store, tokens)?;
    let fields = read_record(source, &mut session.out)?;
    let person = build_person(&fields)?;
    require_mut(&mut session.store)?.update(key, person)?;
    writeln!(session.out, "Element {key} updated.")?;
    Ok(Flow::Continue)
}

pub(super) fn remove<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    tokens: &[&str],
) -> CommandResult {
    let key = existing_key(&session.store, tokens)?;
    require_mut(&mut session.store)?.remove(key)?;
    writeln!(session.out, "Element {key} removed.")?;
    Ok(Flow::Continue)
}

pub(super) fn clear<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    let store = require_mut(&mut session.store)?;
    if store.is_empty() {
        writeln!(session.out, "The collection is already empty.")?;
        return Ok(Flow::Continue);
    }
    store.clear();
    writeln!(session.out, "Collection cleared.")?;
    Ok(Flow::Continue)
}

pub(super) fn save<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    let store = require(&session.store)?;
    save_collection(&session.collection_path, store)?;
    writeln!(
        session.out,
        "Collection saved to {}.",
        session.collection_path.display()
    )?;
    Ok(Flow::Continue)
}

pub(super) fn script<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    tokens: &[&str],
) -> CommandResult {
    let target = PathBuf::from(tokens[1]);
    if session.active_script.as_deref() == Some(target.as_path())
        || session.script_depth >= MAX_SCRIPT_DEPTH
    {
        return Err(CommandError::ScriptRecursion(target));
    }
    let mut script = ScriptSource::open(&target)?;

    let started_at = Instant::now();
    info!(
        "event=script_run module=shell status=start path={} depth={}",
        target.display(),
        session.script_depth + 1
    );
    let previous = session.active_script.replace(target.clone());
    session.script_depth += 1;
    let result = session.run(&mut script);
    session.script_depth -= 1;
    session.active_script = previous;

    let duration_ms = started_at.elapsed().as_millis();
    let flow = match result {
        Ok(flow) => {
            info!(
                "event=script_run module=shell status=ok path={} lines={} duration_ms={duration_ms}",
                target.display(),
                script.line_no()
            );
            flow
        }
        Err(err) => {
            warn!(
                "event=script_run module=shell status=error path={} error_code={} duration_ms={duration_ms}",
                target.display(),
                err.code()
            );
            return Err(err);
        }
    };

    if flow == Flow::Continue {
        writeln!(session.out, "Script {} finished.", target.display())?;
    }
    Ok(flow)
}

pub(super) fn exit<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    writeln!(session.out, "Exiting without saving.")?;
    Ok(Flow::Exit)
}

pub(super) fn replace_if_greater<W: Write>(
    session: &mut Session<W>,
    source: &mut dyn InputSource,
    tokens: &[&str],
) -> CommandResult {
    let key = existing_key(&session.store, tokens)?;
    let fields = read_record(source, &mut session.out)?;
    let candidate = build_person(&fields)?;
    if require_mut(&mut session.store)?.replace_if_greater(key, candidate)? {
        writeln!(session.out, "Element {key} replaced.")?;
    } else {
        writeln!(
            session.out,
            "New element is not greater; element {key} kept."
        )?;
    }
    Ok(Flow::Continue)
}

fn remove_by_key<W: Write>(
    session: &mut Session<W>,
    tokens: &[&str],
    direction: KeyDirection,
) -> CommandResult {
    let key = existing_key(&session.store, tokens)?;
    let removed = require_mut(&mut session.store)?.remove_where(key, direction);
    writeln!(session.out, "{removed} element(s) removed.")?;
    Ok(Flow::Continue)
}

pub(super) fn remove_greater_key<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    tokens: &[&str],
) -> CommandResult {
    remove_by_key(session, tokens, KeyDirection::Greater)
}

pub(super) fn remove_lower_key<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    tokens: &[&str],
) -> CommandResult {
    remove_by_key(session, tokens, KeyDirection::Lower)
}

pub(super) fn sort_print<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    let store = require_non_empty(&session.store)?;
    for key in store.sorted_keys() {
        if let Some(person) = store.get(key) {
            writeln!(session.out, "key: [{key}] = value: {person}")?;
        }
    }
    Ok(Flow::Continue)
}

pub(super) fn sort_hair<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    let store = require_non_empty(&session.store)?;
    let colors = store.sorted_hair_colors();
    if colors.is_empty() {
        writeln!(session.out, "No element has a hair color.")?;
    } else {
        writeln!(session.out, "{}", color_list(&colors))?;
    }
    Ok(Flow::Continue)
}

pub(super) fn unique_hair<W: Write>(
    session: &mut Session<W>,
    _source: &mut dyn InputSource,
    _tokens: &[&str],
) -> CommandResult {
    let store = require_non_empty(&session.store)?;
    let colors = store.unique_hair_colors();
    if colors.is_empty() {
        writeln!(session.out, "No hair color occurs exactly once.")?;
    } else {
        writeln!(session.out, "{}", color_list(&colors))?;
    }
    Ok(Flow::Continue)
}
