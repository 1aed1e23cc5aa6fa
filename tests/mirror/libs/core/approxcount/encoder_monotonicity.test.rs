// [tests/mirror/libs/core/approxcount/encoder_monotonicity.test.rs]
/*!
 * =================================================================
 * APARATO: APPROX CODEC MONOTONICITY SWEEP
 * CLASIFICACIÓN: PROVING GROUNDS // ESTRATO L1-APPROXCOUNT
 * RESPONSABILIDAD: PROPIEDADES DE ORDEN Y COTA DE ERROR RELATIVO
 * =================================================================
 */

use centinela_core_approxcount::Encoder;
use proptest::prelude::*;

proptest! {
    /// La decodificación nunca decrece al crecer el byte codificado.
    #[test]
    fn decode_is_monotone(max in 2u64..=u64::MAX, a in 0u8..=255u8, b in 0u8..=255u8) {
        let encoder = Encoder::new(max).unwrap();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(encoder.decode(low) <= encoder.decode(high));
    }

    /// La codificación preserva el orden de los valores de entrada.
    #[test]
    fn encode_is_weakly_monotone(
        max in 2u64..=u64::MAX,
        pair in (1u64..=u64::MAX, 1u64..=u64::MAX),
    ) {
        let encoder = Encoder::new(max).unwrap();
        let a = 1 + pair.0 % max;
        let b = 1 + pair.1 % max;
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(encoder.encode(low) <= encoder.encode(high));
    }

    /// El viaje completo respeta la cota del paso de la retícula
    /// logarítmica: error relativo de medio paso más el redondeo.
    #[test]
    fn roundtrip_error_is_log_bounded(max in 2u64..=u64::MAX, seed in 1u64..=u64::MAX) {
        let encoder = Encoder::new(max).unwrap();
        let value = 1 + seed % max;
        let decoded = encoder.decode(encoder.encode(value));

        let c = 255.0 / (max as f64).ln();
        let half_step = (1.0 / (2.0 * c)).exp() - 1.0;
        let tolerance = (value as f64 * (half_step + 0.001)).ceil() as u64 + 1;
        prop_assert!(
            decoded.abs_diff(value) <= tolerance,
            "max {} valor {} decodificó a {} (tolerancia {})",
            max, value, decoded, tolerance
        );
    }
}
