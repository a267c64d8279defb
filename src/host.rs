//! Untyped map operations over shared host values.
//!
//! These take arguments as [`Value`]s, so they check at run time what the
//! typed API gets from the compiler: that a predicate is callable, that a
//! merge argument is a map, that constructor input is a list of pairs.
//! Callbacks run with the map unborrowed, over a snapshot, so they may read
//! or mutate the very map being traversed.

use crate::error::{Error, Result};
use crate::map::SMap;
use crate::value::{Function, MapRef, Value};
use core::cell::Ref;
use std::rc::Rc;
use tracing::trace;

const NOT_CALLABLE: &str = "Expected a function argument";
const NOT_A_MAP: &str = "Cannot merge with objects that are not Maps";
const BAD_FOR_EACH: &str = "Invalid callback function given to forEach";
const BAD_ENTRY: &str = "Invalid iterable passed to Map constructor";
const BAD_INIT: &str = "Invalid Map";

/// Builds a map from `undefined` (empty) or an array of two-element arrays.
pub fn construct(init: &Value) -> Result<SMap<Value, Value>> {
    let rows = match init {
        Value::Undefined => return Ok(SMap::new()),
        Value::Array(rows) => rows,
        _ => return Err(Error::invalid_argument(BAD_INIT)),
    };
    // Validate everything first so a bad row leaves nothing half-built.
    let pairs = rows
        .iter()
        .map(|row| match row {
            Value::Array(pair) if pair.len() == 2 => Ok((pair[0].clone(), pair[1].clone())),
            _ => Err(Error::invalid_argument(BAD_ENTRY)),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(pairs.into_iter().collect())
}

/// `construct`, wrapped as a shared map value.
pub fn new_map(init: &Value) -> Result<Value> {
    construct(init).map(Value::map)
}

fn callable<'a>(f: &'a Value, msg: &str) -> Result<&'a Function> {
    f.as_function().ok_or_else(|| Error::invalid_argument(msg))
}

fn map_arg(other: &Value) -> Result<Ref<'_, SMap<Value, Value>>> {
    let m = other.as_map().ok_or_else(|| Error::invalid_argument(NOT_A_MAP))?;
    m.try_borrow().map_err(|_| Error::MapBorrowed)
}

/// Calls a `(key, value[, index])` predicate. The index is only passed to
/// functions declaring more than two parameters.
fn test_entry(pred: &Function, key: &Value, value: &Value, index: usize) -> bool {
    let out = if pred.arity() > 2 {
        pred.call(
            &Value::Undefined,
            &[key.clone(), value.clone(), Value::Number(index as f64)],
        )
    } else {
        pred.call(&Value::Undefined, &[key.clone(), value.clone()])
    };
    out.is_truthy()
}

pub fn get(map: &MapRef, key: &Value) -> Value {
    map.borrow().get(key).cloned().unwrap_or_default()
}

pub fn set(map: &MapRef, key: Value, value: Value) {
    map.borrow_mut().set(key, value);
}

pub fn has(map: &MapRef, key: &Value) -> bool {
    map.borrow().has(key)
}

pub fn delete(map: &MapRef, key: &Value) -> bool {
    map.borrow_mut().delete(key)
}

pub fn size(map: &MapRef) -> usize {
    map.borrow().len()
}

pub fn clear(map: &MapRef) {
    map.borrow_mut().clear();
}

pub fn is_empty(map: &MapRef) -> bool {
    map.borrow().is_empty()
}

/// The value at `key`, else `default`, else `undefined`.
pub fn fetch(map: &MapRef, key: &Value, default: Option<Value>) -> Value {
    map.borrow().get(key).cloned().or(default).unwrap_or_default()
}

/// Calls `callback(value, key, map)` with `this` bound to `this_arg`, for
/// every entry present when the call starts.
pub fn for_each(map: &MapRef, callback: &Value, this_arg: &Value) -> Result<()> {
    let f = callable(callback, BAD_FOR_EACH)?;
    let items = map.borrow().snapshot();
    let map_value = Value::Map(map.clone());
    for (k, v) in items {
        f.call(this_arg, &[v, k, map_value.clone()]);
    }
    Ok(())
}

pub fn filter(map: &MapRef, predicate: &Value) -> Result<Value> {
    let pred = callable(predicate, NOT_CALLABLE)?;
    let items = map.borrow().snapshot();
    let from = items.len();
    let mut out = SMap::new();
    for (i, (k, v)) in items.enumerate() {
        if test_entry(pred, &k, &v, i) {
            out.set(k, v);
        }
    }
    trace!(from, kept = out.len(), "host filter");
    Ok(Value::map(out))
}

pub fn reject(map: &MapRef, predicate: &Value) -> Result<()> {
    let pred = callable(predicate, NOT_CALLABLE)?;
    let items = map.borrow().snapshot();
    for (i, (k, v)) in items.enumerate() {
        if test_entry(pred, &k, &v, i) {
            map.borrow_mut().delete(&k);
        }
    }
    trace!(left = map.borrow().len(), "host reject");
    Ok(())
}

pub fn merge(map: &MapRef, other: &Value) -> Result<Value> {
    let merged = {
        let other = map_arg(other)?;
        map.try_borrow().map_err(|_| Error::MapBorrowed)?.merge(&other)
    };
    Ok(Value::map(merged))
}

/// Sets every entry of `other` into `map`. Merging a map into itself is a
/// no-op.
pub fn merge_in_place(map: &MapRef, other: &Value) -> Result<()> {
    if matches!(other, Value::Map(o) if Rc::ptr_eq(o, map)) {
        return Ok(());
    }
    let other = map_arg(other)?;
    let mut m = map.try_borrow_mut().map_err(|_| Error::MapBorrowed)?;
    m.merge_in_place(&other);
    Ok(())
}

pub fn invert(map: &MapRef) -> Value {
    Value::map(map.borrow().invert())
}
