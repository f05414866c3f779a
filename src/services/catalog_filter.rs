use std::collections::BTreeSet;

use crate::models::{CartItem, Product};

/// Lower-cased platform names declared by anything in the cart
pub fn cart_platforms(cart: &[CartItem]) -> BTreeSet<String> {
    cart.iter()
        .flat_map(|item| item.product.platform_keys())
        .collect()
}

/// Narrows the catalog to products compatible with the cart's platforms
///
/// A product passes when it declares no platform at all (merchandise,
/// furniture) or when any of its platforms matches any cart platform. A cart
/// without platform categories leaves the catalog untouched. Catalog order is
/// preserved.
pub fn filter_catalog(cart: &[CartItem], catalog: &[Product]) -> Vec<Product> {
    let platforms = cart_platforms(cart);

    if platforms.is_empty() {
        return catalog.to_vec();
    }

    catalog
        .iter()
        .filter(|product| {
            let keys = product.platform_keys();
            keys.is_empty() || keys.iter().any(|key| platforms.contains(key))
        })
        .cloned()
        .collect()
}
