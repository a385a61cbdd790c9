//! Setting value validation.

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "LOGOCRAFT_THRESHOLD" => validate_int_range(value, 0, 255)?,
        "LOGOCRAFT_MAX_PARALLEL" => validate_int_range(value, 1, 64)?,
        "LOGOCRAFT_DITHER" => {
            if value != "true" && value != "false" {
                return Err("must be 'true' or 'false'".into());
            }
        }
        "LOGOCRAFT_OUTPUT_DIR" | "LOGOCRAFT_CATALOG" => {
            if value.trim().is_empty() {
                return Err("path must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.trim().parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
