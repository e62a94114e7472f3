//! Curated demo catalogue.
//!
//! Prices are minor units (cents) so the backend never touches floating
//! point. Image fields are stable file-store reference paths; the demo
//! assets ship with the deployment, not with this crate.

use serde::{Deserialize, Serialize};

/// The fixed storefront categories, in display order.
///
/// The backend owns the authoritative category enum; this list exists so the
/// generator and its tests can stay decoupled from backend types while still
/// agreeing on the vocabulary.
pub const CATEGORIES: [&str; 8] = [
    "Snacks & Sweets",
    "Beverages",
    "Stationery",
    "Home & Decor",
    "Fashion & Accessories",
    "Traditional Crafts",
    "Beauty & Skincare",
    "Toys & Figures",
];

/// Returns true when `category` is one of the storefront categories.
#[must_use]
pub fn is_known_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// A product ready for insertion into an empty catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSeed {
    /// Display name.
    pub name: String,
    /// Longer marketing description.
    pub description: String,
    /// Unit price in minor units (cents).
    pub price_cents: i64,
    /// File-store reference for the product image.
    pub image: String,
    /// One of [`CATEGORIES`].
    pub category: String,
    /// Units available for sale.
    pub stock: i32,
    /// Whether the product appears in the featured strip.
    pub featured: bool,
}

fn product(
    name: &str,
    description: &str,
    price_cents: i64,
    image: &str,
    category: &str,
    stock: i32,
    featured: bool,
) -> ProductSeed {
    ProductSeed {
        name: name.to_owned(),
        description: description.to_owned(),
        price_cents,
        image: image.to_owned(),
        category: category.to_owned(),
        stock,
        featured,
    }
}

/// The curated demo catalogue: two representative products per category.
#[must_use]
pub fn demo_catalogue() -> Vec<ProductSeed> {
    vec![
        product(
            "Matcha Kit Kat Box",
            "Premium Japanese matcha-flavoured Kit Kat bars. A rich blend of green tea and smooth chocolate, exclusively from Japan.",
            1299,
            "/uploads/products/matcha-kitkat.jpg",
            "Snacks & Sweets",
            50,
            true,
        ),
        product(
            "Tokyo Banana Cake",
            "Famous Tokyo souvenir: soft sponge cake filled with banana custard cream. Individually wrapped for freshness.",
            1850,
            "/uploads/products/tokyo-banana.jpg",
            "Snacks & Sweets",
            30,
            false,
        ),
        product(
            "Premium Sencha Green Tea",
            "First-flush Japanese green tea from Uji, Kyoto. Delicate flavour with sweet umami notes. 100g loose leaf.",
            2499,
            "/uploads/products/sencha-tea.jpg",
            "Beverages",
            40,
            true,
        ),
        product(
            "Ramune Soda Variety Pack",
            "Classic Japanese marble soda in 6 flavours: Original, Strawberry, Melon, Lychee, Grape and Peach.",
            1599,
            "/uploads/products/ramune-soda.jpg",
            "Beverages",
            60,
            false,
        ),
        product(
            "Sakura Washi Tape Set",
            "Set of 5 decorative washi tapes featuring cherry blossom patterns. Perfect for journaling, scrapbooking and crafts.",
            999,
            "/uploads/products/washi-tape.jpg",
            "Stationery",
            75,
            false,
        ),
        product(
            "Pilot Frixion Pen Set",
            "Erasable gel ink pens in 10 vibrant colours. Smooth writing with heat-erasable ink technology.",
            1450,
            "/uploads/products/frixion-pens.jpg",
            "Stationery",
            45,
            false,
        ),
        product(
            "Ceramic Ramen Bowl Set",
            "Handcrafted Japanese ceramic ramen bowl with matching chopsticks and spoon. Traditional wave pattern in indigo.",
            3499,
            "/uploads/products/ramen-bowl.jpg",
            "Home & Decor",
            20,
            true,
        ),
        product(
            "Noren Curtain - Mt. Fuji",
            "Traditional Japanese door curtain featuring a Mt. Fuji design. Cotton fabric, 85cm x 150cm.",
            2800,
            "/uploads/products/noren-curtain.jpg",
            "Home & Decor",
            15,
            false,
        ),
        product(
            "Furoshiki Wrapping Cloth",
            "Versatile Japanese wrapping cloth with traditional pattern. Use as gift wrap, bag or decoration. 70cm x 70cm, 100% cotton.",
            1600,
            "/uploads/products/furoshiki.jpg",
            "Fashion & Accessories",
            35,
            false,
        ),
        product(
            "Tabi Split-Toe Socks",
            "Pack of 3 pairs of traditional Japanese split-toe socks. Comfortable cotton blend in assorted colours.",
            1199,
            "/uploads/products/tabi-socks.jpg",
            "Fashion & Accessories",
            55,
            false,
        ),
        product(
            "Kintsugi Repair Kit",
            "Repair broken ceramics with gold joinery in the traditional Japanese style. Includes lacquer, gold powder and brushes.",
            3200,
            "/uploads/products/kintsugi-kit.jpg",
            "Traditional Crafts",
            25,
            true,
        ),
        product(
            "Daruma Wishing Doll",
            "Hand-painted papier-mache Daruma doll from Takasaki. Paint one eye when you set a goal, the other when you reach it.",
            1750,
            "/uploads/products/daruma-doll.jpg",
            "Traditional Crafts",
            40,
            false,
        ),
        product(
            "Camellia Hair Oil",
            "Pure tsubaki oil from the Izu islands, pressed the traditional way. Softens hair and skin without residue.",
            2250,
            "/uploads/products/camellia-oil.jpg",
            "Beauty & Skincare",
            30,
            false,
        ),
        product(
            "Sakura Hand Cream Trio",
            "Three cherry-blossom scented hand creams in travel sizes. Lightly floral, fast absorbing.",
            1680,
            "/uploads/products/sakura-hand-cream.jpg",
            "Beauty & Skincare",
            65,
            true,
        ),
        product(
            "Gachapon Capsule Set",
            "A surprise set of 5 capsule toys from current Japanese gachapon machines. No duplicates within a set.",
            1400,
            "/uploads/products/gachapon-set.jpg",
            "Toys & Figures",
            80,
            false,
        ),
        product(
            "Kendama Wooden Skill Toy",
            "Competition-grade beechwood kendama with extra string. The classic Japanese cup-and-ball game.",
            2100,
            "/uploads/products/kendama.jpg",
            "Toys & Figures",
            35,
            false,
        ),
    ]
}

#[cfg(test)]
mod tests {
    //! Sanity checks keeping the curated list aligned with the storefront.

    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn every_product_uses_a_known_category() {
        for seed in demo_catalogue() {
            assert!(
                is_known_category(&seed.category),
                "unknown category: {}",
                seed.category
            );
        }
    }

    #[rstest]
    fn every_category_is_represented() {
        let used: HashSet<String> = demo_catalogue().into_iter().map(|p| p.category).collect();
        assert_eq!(used.len(), CATEGORIES.len());
    }

    #[rstest]
    fn prices_and_stock_are_positive() {
        for seed in demo_catalogue() {
            assert!(seed.price_cents > 0, "{} has no price", seed.name);
            assert!(seed.stock > 0, "{} has no stock", seed.name);
        }
    }

    #[rstest]
    fn names_are_unique() {
        let products = demo_catalogue();
        let names: HashSet<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), products.len());
    }
}
