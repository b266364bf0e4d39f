// ============================================================================
// Structures : MarketSnapshot, PricePoint, MarketStat
// ============================================================================
// Données de marché statiques affichées sur le dashboard
//
// Données d'exemple uniquement : pas de fetch, pas de logique métier.
// Le panneau "pulse" et le graphique 7 jours sont purement décoratifs.
// ============================================================================

/// Un point de prix journalier pour le graphique 7 jours
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Jour de la semaine (label de l'axe X)
    pub day: &'static str,

    /// Prix de clôture en USD
    pub price: f64,
}

/// Une statistique du panneau "pulse" (market cap, TVL, etc.)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketStat {
    pub label: &'static str,
    pub value: &'static str,

    /// Statistique mise en avant (couleur différente)
    pub highlight: bool,
}

/// Photo instantanée du marché affichée par le dashboard
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    /// Prix actuel en USD (dernier point du graphique)
    pub price_usd: f64,

    /// Variation sur 7 jours en pourcentage
    pub change_7d_percent: f64,

    /// Points du graphique 7 jours
    pub points: Vec<PricePoint>,

    /// Statistiques du panneau pulse
    pub stats: Vec<MarketStat>,
}

impl MarketSnapshot {
    /// Jeu de données d'exemple (7 jours de prix SOL + stats réseau)
    pub fn sample() -> Self {
        let points = vec![
            PricePoint { day: "Mon", price: 188.0 },
            PricePoint { day: "Tue", price: 190.0 },
            PricePoint { day: "Wed", price: 187.0 },
            PricePoint { day: "Thu", price: 192.0 },
            PricePoint { day: "Fri", price: 193.0 },
            PricePoint { day: "Sat", price: 191.0 },
            PricePoint { day: "Sun", price: 194.5 },
        ];

        let stats = vec![
            MarketStat { label: "MC", value: "$106.8B", highlight: false },
            MarketStat { label: "TVL", value: "$11.37B", highlight: false },
            MarketStat { label: "Vol", value: "$3.1B", highlight: false },
            MarketStat { label: "Fees", value: "$5.5M", highlight: false },
            MarketStat { label: "Active", value: "2.48M", highlight: false },
            MarketStat { label: "TPS", value: "3.2K", highlight: true },
        ];

        Self {
            price_usd: 194.5,
            change_7d_percent: 2.1,
            points,
            stats,
        }
    }

    /// Retourne true si la tendance 7 jours est positive
    pub fn is_positive(&self) -> bool {
        self.change_7d_percent >= 0.0
    }

    /// Bornes min/max des prix pour l'axe Y du graphique
    ///
    /// CONCEPT RUST : fold pour min/max en un seul passage
    pub fn price_bounds(&self) -> (f64, f64) {
        self.points.iter().fold(
            (f64::MAX, f64::MIN),
            |(min, max), p| (min.min(p.price), max.max(p.price)),
        )
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_has_seven_days() {
        let market = MarketSnapshot::sample();
        assert_eq!(market.points.len(), 7);
        assert_eq!(market.points[0].day, "Mon");
        assert_eq!(market.points[6].day, "Sun");
    }

    #[test]
    fn test_price_matches_last_point() {
        let market = MarketSnapshot::sample();
        assert_eq!(market.price_usd, market.points.last().unwrap().price);
    }

    #[test]
    fn test_price_bounds() {
        let market = MarketSnapshot::sample();
        let (min, max) = market.price_bounds();
        assert_eq!(min, 187.0);
        assert_eq!(max, 194.5);
    }

    #[test]
    fn test_sample_is_positive() {
        assert!(MarketSnapshot::sample().is_positive());
    }
}
