//! C library functions that `_FORTIFY_SOURCE` can replace with a checked
//! `__<name>_chk` variant.

/// Buffer-overflow-prone libc functions, sorted so lookups can binary search.
pub static SENSITIVE_FUNCTIONS: &[&str] = &[
    "asprintf",
    "confstr",
    "dprintf",
    "fgets",
    "fgets_unlocked",
    "fgetws",
    "fgetws_unlocked",
    "fprintf",
    "fread",
    "fread_unlocked",
    "fwprintf",
    "getcwd",
    "getdomainname",
    "getgroups",
    "gethostname",
    "getlogin_r",
    "gets",
    "getwd",
    "longjmp",
    "mbsnrtowcs",
    "mbsrtowcs",
    "mbstowcs",
    "memcpy",
    "memmove",
    "mempcpy",
    "memset",
    "obstack_printf",
    "obstack_vprintf",
    "pread",
    "pread64",
    "printf",
    "ptsname_r",
    "read",
    "readlink",
    "readlinkat",
    "realpath",
    "recv",
    "recvfrom",
    "snprintf",
    "sprintf",
    "stpcpy",
    "stpncpy",
    "strcat",
    "strcpy",
    "strncat",
    "strncpy",
    "swprintf",
    "syslog",
    "ttyname_r",
    "vasprintf",
    "vdprintf",
    "vfprintf",
    "vfwprintf",
    "vprintf",
    "vsnprintf",
    "vsprintf",
    "vswprintf",
    "vsyslog",
    "vwprintf",
    "wcpcpy",
    "wcpncpy",
    "wcrtomb",
    "wcscat",
    "wcscpy",
    "wcsncat",
    "wcsncpy",
    "wcsnrtombs",
    "wcsrtombs",
    "wcstombs",
    "wctomb",
    "wmemcpy",
    "wmemmove",
    "wmempcpy",
    "wmemset",
    "wprintf",
];

const FORTIFIED_PREFIX: &str = "__";
const FORTIFIED_SUFFIX: &str = "_chk";

/// Exact, case-sensitive catalog membership.
pub fn is_sensitive(name: &str) -> bool {
    SENSITIVE_FUNCTIONS.binary_search(&name).is_ok()
}

/// Returns the catalog entry `name` fortifies, if `name` is exactly
/// `__<entry>_chk`.
pub fn fortified_base(name: &str) -> Option<&str> {
    let base = name
        .strip_prefix(FORTIFIED_PREFIX)?
        .strip_suffix(FORTIFIED_SUFFIX)?;
    is_sensitive(base).then_some(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_sorted_and_unique() {
        assert!(SENSITIVE_FUNCTIONS.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(SENSITIVE_FUNCTIONS.len(), 75);
    }

    #[test]
    fn test_is_sensitive_exact() {
        assert!(is_sensitive("strcpy"));
        assert!(is_sensitive("pread64"));
        assert!(!is_sensitive("strcpy_safe"));
        assert!(!is_sensitive("my_strcpy_wrapper"));
        assert!(!is_sensitive("STRCPY"));
        assert!(!is_sensitive(""));
    }

    #[test]
    fn test_fortified_base() {
        assert_eq!(fortified_base("__strcpy_chk"), Some("strcpy"));
        assert_eq!(fortified_base("__memcpy_chk"), Some("memcpy"));
        assert_eq!(fortified_base("__stack_chk_fail"), None);
        assert_eq!(fortified_base("__strcpy_chk_wrapper"), None);
        assert_eq!(fortified_base("_strcpy_chk"), None);
        assert_eq!(fortified_base("__chk"), None);
        assert_eq!(fortified_base("strcpy"), None);
    }

    #[test]
    fn test_every_entry_has_a_fortified_form() {
        for function in SENSITIVE_FUNCTIONS {
            let fortified = format!("{FORTIFIED_PREFIX}{function}{FORTIFIED_SUFFIX}");
            assert_eq!(fortified_base(&fortified), Some(*function));
        }
    }
}
