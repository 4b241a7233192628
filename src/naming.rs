//! Attribute name translation between snake_case and the API's camelCase.
//!
//! Every resource type resolves attribute names through this pair of
//! functions. `to_camel` upper-cases the character following each
//! underscore (`size_g_b` -> `sizeGB`); `to_snake` inserts an underscore
//! before each upper-case letter after the first and lower-cases it. The
//! two are inverse for every key that starts lower-case, which covers every
//! key the provider returns. Keys starting upper-case (`ID` -> `i_d`) do not
//! survive `to_camel`; [`crate::Attributes`] resolves those by scanning.

/// Convert a snake_case attribute name to the API's camelCase key.
///
/// Names starting with an underscore are private and pass through unchanged.
pub fn to_camel(name: &str) -> String {
    if name.starts_with('_') {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c == '_' {
            match chars.next() {
                Some(next) => out.extend(next.to_uppercase()),
                None => out.push('_'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert an API camelCase key to its snake_case attribute name.
pub fn to_snake(key: &str) -> String {
    if key.starts_with('_') {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            // A leading underscore would turn the name private.
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_camel() {
        assert_eq!(to_camel("size_g_b"), "sizeGB");
        assert_eq!(to_camel("partition_paths"), "partitionPaths");
        assert_eq!(to_camel("supports_premium_storage"), "supportsPremiumStorage");
        assert_eq!(to_camel("internal_i_p_address"), "internalIPAddress");
        assert_eq!(to_camel("id"), "id");
    }

    #[test]
    fn test_to_snake() {
        assert_eq!(to_snake("sizeGB"), "size_g_b");
        assert_eq!(to_snake("sourceRestrictions"), "source_restrictions");
        assert_eq!(to_snake("portTo"), "port_to");
    }

    #[test]
    fn test_leading_capital_gets_no_underscore() {
        assert_eq!(to_snake("ID"), "i_d");
        assert_eq!(to_snake("Name"), "name");
        assert!(!to_snake("URLPath").starts_with('_'));
    }

    #[test]
    fn test_private_names_pass_through() {
        assert_eq!(to_camel("_ports"), "_ports");
        assert_eq!(to_snake("_ports"), "_ports");
    }

    #[test]
    fn test_trailing_underscore_is_kept() {
        assert_eq!(to_camel("name_"), "name_");
    }

    #[test]
    fn test_round_trip_over_provider_keys() {
        let keys = [
            "id",
            "sizeGB",
            "partitionPaths",
            "internalIPAddress",
            "sourceRestrictions",
            "supportsPremiumStorage",
            "supportsSharedLoadBalancer",
            "deployableNetworks",
            "locationId",
            "memoryMB",
            "portTo",
        ];
        for key in keys {
            let snake = to_snake(key);
            assert_eq!(to_camel(&snake), key, "round trip failed for {key}");
            assert_eq!(to_snake(&to_camel(&snake)), snake);
        }
    }
}
