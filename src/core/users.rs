//! User and group database lookups (`chown`, `chgrp`, `ps`, `pkill -u`).

use std::ffi::{CStr, CString};

use crate::error::{Error, Result};

/// Resolve a user name or numeric uid.
pub fn uid(spec: &str) -> Result<u32> {
    if let Ok(n) = spec.parse::<u32>() {
        return Ok(n);
    }
    let name = CString::new(spec).map_err(|_| Error::invalid_argument("user", spec))?;
    // SAFETY: getpwnam returns NULL or a pointer to static storage.
    let pw = unsafe { libc::getpwnam(name.as_ptr()) };
    if pw.is_null() {
        return Err(Error::invalid_argument("user", spec));
    }
    Ok(unsafe { (*pw).pw_uid })
}

/// Resolve a group name or numeric gid.
pub fn gid(spec: &str) -> Result<u32> {
    if let Ok(n) = spec.parse::<u32>() {
        return Ok(n);
    }
    let name = CString::new(spec).map_err(|_| Error::invalid_argument("group", spec))?;
    // SAFETY: getgrnam returns NULL or a pointer to static storage.
    let gr = unsafe { libc::getgrnam(name.as_ptr()) };
    if gr.is_null() {
        return Err(Error::invalid_argument("group", spec));
    }
    Ok(unsafe { (*gr).gr_gid })
}

/// User name for `uid`, or the number itself when unknown.
pub fn user_name(uid: u32) -> String {
    // SAFETY: getpwuid returns NULL or a pointer to static storage.
    let pw = unsafe { libc::getpwuid(uid) };
    if pw.is_null() {
        return uid.to_string();
    }
    unsafe { CStr::from_ptr((*pw).pw_name) }
        .to_string_lossy()
        .into_owned()
}

/// Group name for `gid`, or the number itself when unknown.
pub fn group_name(gid: u32) -> String {
    // SAFETY: getgrgid returns NULL or a pointer to static storage.
    let gr = unsafe { libc::getgrgid(gid) };
    if gr.is_null() {
        return gid.to_string();
    }
    unsafe { CStr::from_ptr((*gr).gr_name) }
        .to_string_lossy()
        .into_owned()
}

/// Split `user[:group]` (also `user.group`) into its parts.
pub fn split_owner(spec: &str) -> (Option<&str>, Option<&str>) {
    let (user, group) = match spec.split_once(':').or_else(|| spec.split_once('.')) {
        Some((u, g)) => (u, Some(g)),
        None => (spec, None),
    };
    let user = if user.is_empty() { None } else { Some(user) };
    let group = group.filter(|g| !g.is_empty());
    (user, group)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_pass_through() {
        assert_eq!(uid("1234").unwrap(), 1234);
        assert_eq!(gid("42").unwrap(), 42);
    }

    #[test]
    fn root_resolves_both_ways() {
        assert_eq!(uid("root").unwrap(), 0);
        assert_eq!(user_name(0), "root");
    }

    #[test]
    fn unknown_user_is_an_error() {
        assert!(uid("no_such_user_kit_test").is_err());
    }

    #[test]
    fn owner_spec_splits() {
        assert_eq!(split_owner("alice:staff"), (Some("alice"), Some("staff")));
        assert_eq!(split_owner("alice"), (Some("alice"), None));
        assert_eq!(split_owner(":staff"), (None, Some("staff")));
        assert_eq!(split_owner("alice:"), (Some("alice"), None));
    }
}
