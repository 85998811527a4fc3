/// Width of a county FIPS code (2-digit state + 3-digit county).
pub const FIPS_WIDTH: usize = 5;

/// Normalize user input into a 5-digit county FIPS code.
///
/// Accepts 1 to 5 ASCII digits and left-pads with zeros, so `"1001"` becomes
/// `"01001"`. Returns `None` for anything else.
pub fn normalize_fips(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty()
        || trimmed.len() > FIPS_WIDTH
        || !trimmed.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }
    Some(format!("{:0>width$}", trimmed, width = FIPS_WIDTH))
}

/// State name for the 2-digit state prefix of a county FIPS code.
pub fn state_name(fips: &str) -> &'static str {
    match fips.get(0..2).unwrap_or_default() {
        "01" => "Alabama",
        "02" => "Alaska",
        "04" => "Arizona",
        "05" => "Arkansas",
        "06" => "California",
        "08" => "Colorado",
        "09" => "Connecticut",
        "10" => "Delaware",
        "11" => "District of Columbia",
        "12" => "Florida",
        "13" => "Georgia",
        "15" => "Hawaii",
        "16" => "Idaho",
        "17" => "Illinois",
        "18" => "Indiana",
        "19" => "Iowa",
        "20" => "Kansas",
        "21" => "Kentucky",
        "22" => "Louisiana",
        "23" => "Maine",
        "24" => "Maryland",
        "25" => "Massachusetts",
        "26" => "Michigan",
        "27" => "Minnesota",
        "28" => "Mississippi",
        "29" => "Missouri",
        "30" => "Montana",
        "31" => "Nebraska",
        "32" => "Nevada",
        "33" => "New Hampshire",
        "34" => "New Jersey",
        "35" => "New Mexico",
        "36" => "New York",
        "37" => "North Carolina",
        "38" => "North Dakota",
        "39" => "Ohio",
        "40" => "Oklahoma",
        "41" => "Oregon",
        "42" => "Pennsylvania",
        "44" => "Rhode Island",
        "45" => "South Carolina",
        "46" => "South Dakota",
        "47" => "Tennessee",
        "48" => "Texas",
        "49" => "Utah",
        "50" => "Vermont",
        "51" => "Virginia",
        "53" => "Washington",
        "54" => "West Virginia",
        "55" => "Wisconsin",
        "56" => "Wyoming",
        _ => "Unknown State",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_fips() {
        assert_eq!(normalize_fips("01001").as_deref(), Some("01001"));
        assert_eq!(normalize_fips("1001").as_deref(), Some("01001"));
        assert_eq!(normalize_fips(" 6037 ").as_deref(), Some("06037"));
        assert_eq!(normalize_fips(""), None);
        assert_eq!(normalize_fips("123456"), None);
        assert_eq!(normalize_fips("12a45"), None);
    }

    #[test]
    fn test_state_name() {
        assert_eq!(state_name("01001"), "Alabama");
        assert_eq!(state_name("11001"), "District of Columbia");
        assert_eq!(state_name("56045"), "Wyoming");
        assert_eq!(state_name("72001"), "Unknown State"); // Puerto Rico not mapped
        assert_eq!(state_name("0"), "Unknown State");
    }
}
