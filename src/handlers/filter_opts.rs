// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! `filter_opts` helper used to strip or keep specific entries out of a
//! separator-delimited `key[=value]` list.

/// Splits `input` on `sep`, keeping or dropping entries whose key (the part
/// before `=`, or the whole entry if there is no `=`) appears in `keys`, then
/// rejoins the survivors with `&`. Order is preserved. When `include` is
/// `true`, only matching entries survive; when `false`, matching entries are
/// dropped.
pub fn filter_opts(input: &str, sep: char, keys: &[&str], include: bool) -> String {
    input
        .split(sep)
        .filter(|entry| {
            let key = entry.split('=').next().unwrap_or(*entry);
            let matches = keys.contains(&key);
            matches == include
        })
        .collect::<Vec<_>>()
        .join("&")
}
