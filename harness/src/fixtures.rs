//! Fixture generation: the synthetic catalogue every workload run seeds.

use crate::driver::{NewProduct, NewReview};
use rand::Rng;

/// Number of products seeded per run.
pub const PRODUCT_COUNT: usize = 1_000;
/// Reviews seeded for every product.
pub const REVIEWS_PER_PRODUCT: usize = 10;

/// Name of the `index`-th seeded product.
pub fn product_name(index: usize) -> String {
    format!("product{index}")
}

/// Price uniform in `[0, 100)`.
pub fn random_price<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>() * 100.0
}

/// `PRODUCT_COUNT` products named `product0..product999` with random prices.
pub fn generate_products<R: Rng + ?Sized>(rng: &mut R) -> Vec<NewProduct> {
    (0..PRODUCT_COUNT)
        .map(|i| NewProduct {
            name: product_name(i),
            price: random_price(rng),
        })
        .collect()
}

/// `REVIEWS_PER_PRODUCT` reviews for every product index.
pub fn generate_reviews() -> Vec<NewReview> {
    let mut reviews = Vec::with_capacity(PRODUCT_COUNT * REVIEWS_PER_PRODUCT);
    for product in 0..PRODUCT_COUNT {
        for j in 0..REVIEWS_PER_PRODUCT {
            reviews.push(NewReview {
                product_id: product as i64,
                review: format!("review{j}"),
            });
        }
    }
    reviews
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn products_have_expected_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let products = generate_products(&mut rng);
        assert_eq!(products.len(), PRODUCT_COUNT);
        assert_eq!(products[0].name, "product0");
        assert_eq!(products[999].name, "product999");
        assert!(products.iter().all(|p| (0.0..100.0).contains(&p.price)));
    }

    #[test]
    fn ten_reviews_per_product() {
        let reviews = generate_reviews();
        assert_eq!(reviews.len(), 10_000);
        assert_eq!(reviews.iter().filter(|r| r.product_id == 42).count(), 10);
        assert_eq!(reviews[9].review, "review9");
    }
}
