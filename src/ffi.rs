//! FFI interface for C/C++ hosts
//!
//! A raw plan goes in as JSON and the display itinerary comes back as JSON.
//! Every returned result owns its strings and must be released with
//! `free_itinerary_result`.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde::Serialize;

use crate::assembler::assemble_with;
use crate::config::ExtractionConfig;
use crate::extractors::extract_days;
use crate::model::RawPlan;
use crate::text::strip_completion_marker;

/// Result struct returned to the host
/// Both pointers are owned by Rust and must be freed via free_itinerary_result
#[repr(C)]
pub struct ItineraryResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if the call failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Assemble a display itinerary from a raw plan.
///
/// # Arguments
/// * `raw_ptr` - Pointer to the raw plan JSON (UTF-8, not necessarily null-terminated)
/// * `raw_len` - Length of the raw plan JSON in bytes
/// * `config_json` - `ExtractionConfig` JSON (null-terminated), or null for defaults
///
/// # Returns
/// ItineraryResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `raw_ptr` must point to valid memory of at least `raw_len` bytes
/// - `config_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_itinerary_result`
#[no_mangle]
pub unsafe extern "C" fn assemble_itinerary_json(
    raw_ptr: *const c_char,
    raw_len: usize,
    config_json: *const c_char,
) -> ItineraryResultFFI {
    let raw_json = match read_bytes(raw_ptr, raw_len) {
        Ok(s) => s,
        Err(msg) => return make_error_result(msg),
    };

    let config = if config_json.is_null() {
        ExtractionConfig::default()
    } else {
        let config_str = match CStr::from_ptr(config_json).to_str() {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in config JSON"),
        };
        match ExtractionConfig::from_json(config_str) {
            Ok(c) => c,
            Err(e) => return make_error_result(&e.to_string()),
        }
    };

    // An absent body is an empty plan, which still assembles
    let raw: RawPlan = if raw_json.trim().is_empty() {
        RawPlan::default()
    } else {
        match serde_json::from_str(raw_json) {
            Ok(r) => r,
            Err(e) => return make_error_result(&format!("Failed to parse raw plan JSON: {}", e)),
        }
    };

    make_json_result(&assemble_with(&raw, &config))
}

/// Parse only the day-by-day plan from narrative text (convenience function)
///
/// # Safety
/// Same as assemble_itinerary_json for `text_ptr`/`text_len`
#[no_mangle]
pub unsafe extern "C" fn extract_days_ffi(
    text_ptr: *const c_char,
    text_len: usize,
    trip_length: u32,
) -> ItineraryResultFFI {
    let text = match read_bytes(text_ptr, text_len) {
        Ok(s) => s,
        Err(msg) => return make_error_result(msg),
    };
    let cap = ExtractionConfig::default().max_placeholder_days;
    make_json_result(&extract_days(&strip_completion_marker(text), trip_length, cap))
}

/// Free an ItineraryResultFFI returned by this library
///
/// # Safety
/// - `result` must have been returned by a function of this module
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_itinerary_result(result: ItineraryResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

unsafe fn read_bytes<'a>(ptr: *const c_char, len: usize) -> Result<&'a str, &'static str> {
    if ptr.is_null() || len == 0 {
        return Ok("");
    }
    let slice = std::slice::from_raw_parts(ptr as *const u8, len);
    std::str::from_utf8(slice).map_err(|_| "Invalid UTF-8 in input")
}

fn make_json_result<T: Serialize>(value: &T) -> ItineraryResultFFI {
    match serde_json::to_string(value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ItineraryResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ItineraryResultFFI {
    let error_cstr = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    ItineraryResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn take(result: ItineraryResultFFI) -> Result<serde_json::Value, String> {
        let out = if result.error_ptr.is_null() {
            let json = CStr::from_ptr(result.json_ptr).to_str().unwrap();
            Ok(serde_json::from_str(json).unwrap())
        } else {
            Err(CStr::from_ptr(result.error_ptr).to_str().unwrap().to_string())
        };
        free_itinerary_result(result);
        out
    }

    #[test]
    fn assembles_from_json() {
        let raw = r#"{"destination": "Ankara", "itinerary": "Intro.\n\n## Day 1: Arrival\n### Morning:\n- Visit Anıtkabir", "trip_length": 1}"#;
        let value = unsafe {
            take(assemble_itinerary_json(
                raw.as_ptr() as *const c_char,
                raw.len(),
                ptr::null(),
            ))
        }
        .unwrap();

        assert_eq!(value["overview"], "Intro.");
        assert_eq!(value["tripLength"], 1);
        assert_eq!(value["days"][0]["activities"][0]["time"], "Morning");
        assert_eq!(value["days"][0]["activities"][0]["description"], "Activity: Visit Anıtkabir");
    }

    #[test]
    fn config_json_is_applied() {
        let raw = r#"{"destination": "Ankara, Turkey", "trip_length": 1}"#;
        let config = CString::new(r#"{"fallback_policy": "synthesize"}"#).unwrap();
        let value = unsafe {
            take(assemble_itinerary_json(
                raw.as_ptr() as *const c_char,
                raw.len(),
                config.as_ptr(),
            ))
        }
        .unwrap();
        assert!(!value["dining"].as_array().unwrap().is_empty());
    }

    #[test]
    fn null_input_is_an_empty_plan() {
        let value = unsafe { take(assemble_itinerary_json(ptr::null(), 0, ptr::null())) }.unwrap();
        assert_eq!(value["days"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn invalid_json_reports_error() {
        let raw = "{not json";
        let err = unsafe {
            take(assemble_itinerary_json(
                raw.as_ptr() as *const c_char,
                raw.len(),
                ptr::null(),
            ))
        }
        .unwrap_err();
        assert!(err.starts_with("Failed to parse raw plan JSON"));
    }

    #[test]
    fn days_only() {
        let text = "## Day 2: Museums\n### Evening:\n- Dinner in Kızılay";
        let value =
            unsafe { take(extract_days_ffi(text.as_ptr() as *const c_char, text.len(), 2)) }
                .unwrap();
        assert_eq!(value[0]["number"], 2);
        assert_eq!(value[0]["activities"][0]["type"], "Dining");
    }

    #[test]
    fn days_only_caps_placeholder_days() {
        let text = "No headings.";
        let value = unsafe {
            take(extract_days_ffi(text.as_ptr() as *const c_char, text.len(), u32::MAX))
        }
        .unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(90));
    }
}
