//! Truncating and compiling standard-atmosphere columns.

use layer_compiler::{
    air_density, compile_layers, limit_height, render_layers, LayerKind, LayerOptions,
    ModelDocument, Preamble, ProfileColumns,
};
use test_utils::{assert_approx_eq, standard_column, MERRA2_PRESSURE_LEVELS};

// ============================================================================
// Column presence
// ============================================================================

#[test]
fn test_absent_constituents_emit_only_base_lines() {
    let pres = MERRA2_PRESSURE_LEVELS.to_vec();
    let (height, temperature) = standard_column(&pres);
    let layers = compile_layers(
        &ProfileColumns::new(&pres, &temperature, &height),
        &LayerOptions::default(),
    )
    .unwrap();

    assert_eq!(layers.len(), pres.len() + 1);
    let text = render_layers(&layers);
    for line in text.lines().filter(|l| !l.is_empty()) {
        assert!(
            line.starts_with("layer")
                || line.starts_with("Pbase")
                || line.starts_with("Tbase")
                || line == "column dry_air vmr",
            "unexpected line: {line}"
        );
    }
    assert_eq!(text.matches("column dry_air vmr").count(), pres.len());
}

#[test]
fn test_dry_air_and_lineshape_options() {
    let pres = [850.0, 700.0];
    let (height, temperature) = standard_column(&pres);
    let options = LayerOptions {
        dry_air: false,
        lineshape: Some("Gross".to_string()),
    };
    let text = render_layers(&compile_layers(&ProfileColumns::new(&pres, &temperature, &height), &options).unwrap());
    assert!(!text.contains("dry_air"));
    assert_eq!(text.matches("lineshape Gross\n").count(), 2);
}

// ============================================================================
// Phase screening boundaries
// ============================================================================

fn liquid_layers(temperature: f64) -> Vec<layer_compiler::AtmosphericLayer> {
    let pres = [500.0, 500.0];
    let height = [5500.0, 5600.0];
    let temp = [temperature, temperature];
    // Just above the threshold at 243 K
    let mmr = 1.5e-10 / (air_density(500.0, 243.0) * 100.0);
    let ql = [mmr, mmr];
    compile_layers(
        &ProfileColumns::new(&pres, &temp, &height).with_liquid(&ql),
        &LayerOptions::default(),
    )
    .unwrap()
}

#[test]
fn test_liquid_kept_at_243k() {
    let layers = liquid_layers(243.0);
    let path = layers[2].liquid_path.expect("liquid path retained");
    assert_approx_eq!(path, 1.5e-10, 1e-20);
    assert!(render_layers(&layers).contains("column lwp_abs_Rayleigh"));
}

#[test]
fn test_liquid_suppressed_at_241k() {
    let layers = liquid_layers(241.0);
    assert_eq!(layers[2].liquid_path, None);
    assert!(!render_layers(&layers).contains("lwp_abs_Rayleigh"));
}

#[test]
fn test_tiny_paths_are_dropped() {
    let pres = [500.0, 450.0];
    let height = [5500.0, 6300.0];
    let temp = [250.0, 245.0];
    let qi = [1e-16, 1e-16];
    let layers = compile_layers(
        &ProfileColumns::new(&pres, &temp, &height).with_ice(&qi),
        &LayerOptions::default(),
    )
    .unwrap();
    assert_eq!(layers[2].ice_path, None);
}

// ============================================================================
// Layer naming
// ============================================================================

#[test]
fn test_three_tier_names() {
    let pres = [500.0, 50.0, 0.5];
    let (height, temperature) = standard_column(&pres);
    let layers = compile_layers(
        &ProfileColumns::new(&pres, &temperature, &height),
        &LayerOptions::default(),
    )
    .unwrap();
    let kinds: Vec<LayerKind> = layers.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LayerKind::TopOfAtmosphere,
            LayerKind::Mesosphere,
            LayerKind::Stratosphere,
            LayerKind::Troposphere
        ]
    );
}

// ============================================================================
// Truncation into compilation
// ============================================================================

#[test]
fn test_site_altitude_becomes_lowest_layer() {
    let pres = MERRA2_PRESSURE_LEVELS.to_vec();
    let (height, temperature) = standard_column(&pres);
    let rh = vec![0.3; pres.len()];

    let clipped = limit_height(&height, 2347.0, &[&pres, &temperature, &rh]).unwrap();
    assert_eq!(clipped.height[0], 2347.0);
    assert!(clipped.height[1] > 2347.0);

    let columns = ProfileColumns::new(&clipped.columns[0], &clipped.columns[1], &clipped.height)
        .with_relative_humidity(&clipped.columns[2]);
    let layers = compile_layers(&columns, &LayerOptions::default()).unwrap();

    let surface = layers.last().unwrap();
    assert!(surface.pressure < 800.0 && surface.pressure > 750.0);
    assert_approx_eq!(surface.relative_humidity.unwrap(), 0.3, 1e-12);

    let doc = ModelDocument::new(Preamble::default(), layers).to_string();
    assert!(doc.starts_with("# Atmospheric model based on MERRA-2 data\n"));
    assert!(doc.contains("T0 2.7 K\nlayer   # empty layer for top of atmosphere\n"));
    assert!(doc.ends_with("column h2o RH 30.000%\n\n"));
}
