/// Sun safety tips shown on the tips panel, in display order
pub const SUN_SAFETY_TIPS: [&str; 5] = [
    "Wear broad-spectrum sunscreen with at least SPF 30.",
    "Seek shade between 10 a.m. and 4 p.m.",
    "Wear protective clothing, a wide-brimmed hat, and sunglasses.",
    "Reapply sunscreen every two hours, or after swimming or sweating.",
    "Drink plenty of water.",
];
