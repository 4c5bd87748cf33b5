//! Product master list offered to item pickers. Line items may still carry
//! free-text names.

pub const PRODUCTS: &[&str] = &[
    "25KG", "50KG", "AQUA 2MM", "AQUA 3MM", "BPLUS", "CCP", "CFP", "CGM", "CGP", "CL1C", "CSSP",
    "CL1M", "CROWN 2MM", "CROWN 3MM", "CROWN 4MM", "CROWN 6MM", "CROWN 9MM", "ECO 4MM", "ECO 6MM",
    "ECO9MM", "TFCON", "TGC", "TGP", "TSSC", "TSSCON", "UCP", "UFP", "UGP", "UL1C", "UPLUS",
    "USSP",
];

pub fn is_known_product(name: &str) -> bool {
    PRODUCTS.contains(&name.trim())
}

/// Name used for lines added from the order editor.
pub fn default_product() -> &'static str {
    PRODUCTS[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact_after_trim() {
        assert!(is_known_product("CCP"));
        assert!(is_known_product(" CROWN 3MM "));
        assert!(!is_known_product("ccp"));
        assert!(!is_known_product("Fish feed"));
        assert_eq!(default_product(), "25KG");
    }
}
