#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use cphd::enums::*;
use cphd::io::{PvpBlock, SupportBlock};
use cphd::metadata::antenna::*;
use cphd::metadata::channel::*;
use cphd::metadata::collection_id::CollectionId;
use cphd::metadata::data::Data;
use cphd::metadata::dwell::{CodTime, Dwell, DwellTime};
use cphd::metadata::error_parameters::*;
use cphd::metadata::geo_info::GeoInfo;
use cphd::metadata::global::*;
use cphd::metadata::match_info::*;
use cphd::metadata::product_info::{CreationInfo, ProductInfo};
use cphd::metadata::pvp::{AddedPvp, Pvp, PvpType};
use cphd::metadata::reference_geometry::*;
use cphd::metadata::scene_coordinates::*;
use cphd::metadata::support_array::*;
use cphd::metadata::tx_rcv::*;
use cphd::metadata::Metadata;
use cphd::types::*;
use ndarray::Array2;
use std::collections::BTreeMap;

pub const NUM_VECTORS: u64 = 6;
pub const NUM_SAMPLES: u64 = 10;
/// 27 standard words plus one added parameter
pub const NUM_BYTES_PVP: u64 = 224;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn channel_parameter(identifier: &str, fx_c: f64) -> ChannelParameter {
    ChannelParameter {
        identifier: identifier.to_string(),
        ref_vector_index: 0,
        fx_fixed: true,
        toa_fixed: true,
        srp_fixed: true,
        signal_normal: Some(true),
        polarization: Polarization { tx_pol: PolarizationType::V, rcv_pol: PolarizationType::V },
        fx_c,
        fx_bw: 1.0e8,
        fx_bw_noise: Some(9.5e7),
        toa_saved: 2.0e-6,
        toa_extended: Some(ToaExtended {
            toa_ext_saved: 2.5e-6,
            lfm_eclipse: Some(LfmEclipse {
                fx_early_low: 9.95e9,
                fx_early_high: 1.0e10,
                fx_late_low: 9.9e9,
                fx_late_high: 1.005e10,
            }),
        }),
        dwell_times: DwellTimes { cod_id: "COD1".to_string(), dwell_id: "DWELL1".to_string() },
        image_area: None,
        antenna: Some(ChannelAntenna {
            tx_apc_id: "APC1".to_string(),
            tx_apat_id: "APAT1".to_string(),
            rcv_apc_id: "APC1".to_string(),
            rcv_apat_id: "APAT1".to_string(),
        }),
        tx_rcv: Some(ChannelTxRcv {
            tx_wf_id: vec!["TXWF1".to_string()],
            rcv_id: vec!["RCV1".to_string(), "RCV2".to_string()],
        }),
        tgt_ref_level: Some(TgtRefLevel { pt_ref: 12.5 }),
        noise_level: Some(NoiseLevel {
            pn_ref: -80.0,
            bn_ref: 0.8,
            fx_noise_profile: vec![
                NoisePoint { fx: 9.95e9, pn: -81.0 },
                NoisePoint { fx: 1.0e10, pn: -80.0 },
                NoisePoint { fx: 1.005e10, pn: -79.5 },
            ],
        }),
    }
}

fn pos_vel_err() -> PosVelErr {
    PosVelErr {
        frame: FrameType::RicEcf,
        p1: 1.0,
        p2: 2.0,
        p3: 3.0,
        v1: 0.1,
        v2: 0.2,
        v3: 0.3,
        corr_coefs: Some(CorrCoefs::from_values([
            0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, -0.1, -0.2, -0.3, -0.4, -0.5, -0.6,
        ])),
        position_decorr: Some(Decorr { corr_coef_zero: 0.5, decorr_rate: 0.01 }),
    }
}

fn gain_phase() -> GainPhasePoly {
    GainPhasePoly {
        gain_poly: Poly2D::new(vec![vec![0.0, 0.5], vec![-1.5, 0.0]]),
        phase_poly: Poly2D::new(vec![vec![0.0]]),
    }
}

/// One monostatic channel with two support arrays and every optional section
pub fn sample_metadata() -> Metadata {
    let mut collection_id = CollectionId::new("SATELLITE-1", "CORE_0001");
    collection_id.collect_type = Some(CollectType::Monostatic);
    collection_id.radar_mode_id = Some("SPOT-A".to_string());
    collection_id.country_codes = vec!["US".to_string(), "GB".to_string()];
    collection_id.parameters.push(Parameter::new("Site", "Range 4"));

    let mut data = Data::new(SignalArrayFormat::Cf8, NUM_BYTES_PVP, &[("CH1", NUM_VECTORS, NUM_SAMPLES)]);
    data.add_support_array("1", 3, 2, 4).expect("IAZ array fits");
    data.add_support_array("AG", 2, 2, 8).expect("gain/phase array fits");

    let mut pvp = Pvp::default();
    pvp.added_pvp.push(AddedPvp { name: "BeamID".to_string(), param: PvpType::new(27, 1, "I8") });

    let mut nested = GeoInfo::new("Runway");
    nested.lines.push(vec![LatLon::new(35.0, -106.0), LatLon::new(35.01, -106.01)]);
    let mut site = GeoInfo::new("Airfield");
    site.desc.push(Parameter::new("Kind", "calibration"));
    site.points.push(LatLon::new(35.005, -106.005));
    site.polygons.push(vec![
        LatLon::new(35.0, -106.0),
        LatLon::new(35.0, -106.02),
        LatLon::new(35.02, -106.02),
    ]);
    site.geo_info.push(nested);

    Metadata {
        collection_id,
        global: Global {
            domain_type: DomainType::Fx,
            sgn: PhaseSgn::Minus,
            timeline: Timeline {
                collection_start: Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap(),
                rcv_collection_start: None,
                tx_time1: 0.0,
                tx_time2: 2.5,
            },
            fx_band: FxBand { fx_min: 9.9e9, fx_max: 1.01e10 },
            toa_swath: ToaSwath { toa_min: -1.0e-6, toa_max: 1.0e-6 },
            tropo_parameters: Some(TropoParameters { n0: 313.0, ref_height: "IARP".to_string() }),
            iono_parameters: Some(IonoParameters { tecv: 12.0, f2_height: Some(350000.0) }),
        },
        scene_coordinates: SceneCoordinates {
            earth_model: EarthModelType::Wgs84,
            iarp: Iarp {
                ecf: Vector3::new(-1_500_000.0, -5_000_000.0, 3_600_000.0),
                llh: LatLonAlt::new(35.0, -106.0, 1600.0),
            },
            reference_surface: ReferenceSurface::Planar {
                u_iax: Vector3::new(0.0, 1.0, 0.0),
                u_iay: Vector3::new(1.0, 0.0, 0.0),
            },
            image_area: AreaType {
                x1y1: Vector2::new(-500.0, -500.0),
                x2y2: Vector2::new(500.0, 500.0),
                polygon: vec![
                    Vector2::new(-500.0, -500.0),
                    Vector2::new(-500.0, 500.0),
                    Vector2::new(500.0, 500.0),
                    Vector2::new(500.0, -500.0),
                ],
            },
            image_area_corners: LatLonCorners::from_corners([
                LatLon::new(35.005, -106.005),
                LatLon::new(35.005, -105.995),
                LatLon::new(34.995, -105.995),
                LatLon::new(34.995, -106.005),
            ]),
            extended_area: Some(AreaType {
                x1y1: Vector2::new(-800.0, -800.0),
                x2y2: Vector2::new(800.0, 800.0),
                polygon: Vec::new(),
            }),
            image_grid: Some(ImageGrid {
                identifier: Some("GRID1".to_string()),
                iarp_location: LineSample::new(100.0, 100.0),
                iax_extent: IaxExtent { line_spacing: 5.0, first_line: -100, num_lines: 200 },
                iay_extent: IayExtent { sample_spacing: 5.0, first_sample: -100, num_samples: 200 },
                segments: vec![Segment {
                    identifier: "SEG1".to_string(),
                    start_line: -100,
                    start_sample: -100,
                    end_line: 99,
                    end_sample: 99,
                    polygon: vec![
                        LineSample::new(-100.0, -100.0),
                        LineSample::new(-100.0, 99.0),
                        LineSample::new(99.0, 99.0),
                    ],
                }],
            }),
        },
        data,
        channel: Channel {
            ref_ch_id: "CH1".to_string(),
            fx_fixed_cphd: true,
            toa_fixed_cphd: true,
            srp_fixed_cphd: false,
            parameters: vec![channel_parameter("CH1", 1.0e10)],
            added_parameters: vec![Parameter::new("Beam", "Fore")],
        },
        pvp,
        support_array: Some(SupportArray {
            iaz_arrays: vec![SupportArrayParameter {
                identifier: 1,
                grid: ArrayGrid {
                    element_format: "IAZ=F4;".to_string(),
                    x0: -10.0,
                    y0: -5.0,
                    x_ss: 10.0,
                    y_ss: 10.0,
                },
            }],
            ant_gain_phase: Vec::new(),
            added_support_arrays: vec![AddedSupportArray {
                identifier: "AG".to_string(),
                grid: ArrayGrid {
                    element_format: "Gain=F4;Phase=F4;".to_string(),
                    x0: -0.1,
                    y0: -0.1,
                    x_ss: 0.2,
                    y_ss: 0.2,
                },
                x_units: "DCX".to_string(),
                y_units: "DCY".to_string(),
                z_units: "dB".to_string(),
                parameters: vec![Parameter::new("Source", "chamber")],
            }],
        }),
        dwell: Dwell {
            cod_times: vec![CodTime {
                identifier: "COD1".to_string(),
                cod_time_poly: Poly2D::new(vec![vec![1.25, 0.001], vec![0.002, 0.0]]),
            }],
            dwell_times: vec![DwellTime {
                identifier: "DWELL1".to_string(),
                dwell_time_poly: Poly2D::new(vec![vec![2.5]]),
            }],
        },
        reference_geometry: ReferenceGeometry {
            srp: Srp {
                ecf: Vector3::new(-1_500_000.0, -5_000_000.0, 3_600_000.0),
                iac: Vector3::new(0.0, 0.0, 0.0),
            },
            reference_time: 1.25,
            srp_cod_time: 1.25,
            srp_dwell_time: 2.5,
            geometry: CollectionGeometry::Monostatic(Monostatic {
                arp_pos: Vector3::new(-1_900_000.0, -5_600_000.0, 4_100_000.0),
                arp_vel: Vector3::new(7000.0, -1500.0, 500.0),
                side_of_track: SideOfTrack::Left,
                slant_range: 850_000.0,
                ground_range: 700_000.0,
                doppler_cone_angle: 89.5,
                graze_angle: 35.0,
                incidence_angle: 55.0,
                azimuth_angle: 270.0,
                twist_angle: -1.5,
                slope_angle: 35.1,
                layover_angle: 268.0,
            }),
        },
        antenna: Some(Antenna {
            ant_coord_frames: vec![AntCoordFrame {
                identifier: "ACF1".to_string(),
                x_axis_poly: PolyXYZ {
                    x: Poly1D::new(vec![1.0, 0.001]),
                    y: Poly1D::new(vec![0.0]),
                    z: Poly1D::new(vec![0.0]),
                },
                y_axis_poly: PolyXYZ {
                    x: Poly1D::new(vec![0.0]),
                    y: Poly1D::new(vec![1.0]),
                    z: Poly1D::new(vec![0.0, 0.0, 1.0e-6]),
                },
            }],
            ant_phase_centers: vec![AntPhaseCenter {
                identifier: "APC1".to_string(),
                acf_id: "ACF1".to_string(),
                apc_xyz: Vector3::new(0.0, 0.0, 0.5),
            }],
            ant_patterns: vec![AntPattern {
                identifier: "APAT1".to_string(),
                freq_zero: 1.0e10,
                gain_zero: Some(42.0),
                eb_freq_shift: Some(false),
                ml_freq_dilation: Some(true),
                gain_bs_poly: Some(Poly1D::new(vec![0.0, 1.0e-9])),
                eb: ElectricalBoresight {
                    dcx_poly: Poly1D::new(vec![0.0]),
                    dcy_poly: Poly1D::new(vec![0.0]),
                },
                array: gain_phase(),
                element: gain_phase(),
                gain_phase_arrays: vec![GainPhaseArray {
                    freq: 1.0e10,
                    array_id: "AG".to_string(),
                    element_id: None,
                }],
            }],
        }),
        tx_rcv: Some(TxRcv {
            tx_wf_parameters: vec![TxWfParameters {
                identifier: "TXWF1".to_string(),
                pulse_length: 1.0e-5,
                rf_bandwidth: 1.0e8,
                freq_center: 1.0e10,
                lfm_rate: Some(1.0e13),
                polarization: PolarizationType::V,
                power: Some(3000.0),
            }],
            rcv_parameters: vec![
                RcvParameters {
                    identifier: "RCV1".to_string(),
                    window_length: 2.0e-5,
                    sample_rate: 1.2e8,
                    if_filter_bw: 1.1e8,
                    freq_center: 1.0e10,
                    lfm_rate: None,
                    polarization: PolarizationType::V,
                    path_gain: Some(10.0),
                },
                RcvParameters {
                    identifier: "RCV2".to_string(),
                    window_length: 2.0e-5,
                    sample_rate: 1.2e8,
                    if_filter_bw: 1.1e8,
                    freq_center: 1.0e10,
                    lfm_rate: Some(1.0e13),
                    polarization: PolarizationType::H,
                    path_gain: None,
                },
            ],
        }),
        error_parameters: Some(ErrorParameters::Monostatic(MonostaticErrors {
            pos_vel_err: pos_vel_err(),
            radar_sensor: RadarSensorError {
                range_bias: 0.5,
                clock_freq_sf: Some(1.0e-9),
                collection_start_time: Some(1.0e-7),
                range_bias_decorr: Some(Decorr { corr_coef_zero: 0.9, decorr_rate: 0.001 }),
            },
            tropo_error: None,
            iono_error: Some(IonoError {
                iono_range_vertical: 1.5,
                iono_range_rate_vertical: None,
                iono_rg_rg_rate_cc: Some(0.25),
                iono_range_vert_decorr: None,
            }),
            added_parameters: vec![Parameter::new("Model", "v2")],
        })),
        product_info: Some(ProductInfo {
            profile: Some("TEST".to_string()),
            creation_info: vec![CreationInfo {
                application: Some("cphd-tests".to_string()),
                date_time: Utc.with_ymd_and_hms(2024, 5, 18, 8, 0, 0).unwrap(),
                site: None,
                parameters: Vec::new(),
            }],
            parameters: vec![Parameter::new("Build", "42")],
        }),
        geo_info: vec![site],
        match_info: Some(MatchInfo {
            match_types: vec![MatchType {
                type_id: "STEREO".to_string(),
                current_index: Some(1),
                match_collections: vec![MatchCollection {
                    core_name: "CORE_0002".to_string(),
                    match_index: Some(2),
                    parameters: Vec::new(),
                }],
            }],
        }),
    }
}

/// Same collection with no support block and no optional sections
pub fn minimal_metadata() -> Metadata {
    let mut metadata = sample_metadata();
    metadata.data = Data::new(SignalArrayFormat::Cf8, NUM_BYTES_PVP, &[("CH1", NUM_VECTORS, NUM_SAMPLES)]);
    metadata.support_array = None;
    metadata.antenna = None;
    metadata.tx_rcv = None;
    metadata.error_parameters = None;
    metadata.product_info = None;
    metadata.geo_info.clear();
    metadata.match_info = None;
    metadata.channel.parameters[0].antenna = None;
    metadata.channel.parameters[0].tx_rcv = None;
    metadata
}

/// Deterministic PVP sets for every channel
pub fn sample_pvp(metadata: &Metadata) -> PvpBlock {
    let mut block = PvpBlock::new(&metadata.data).expect("PVP layout fits");
    let pvp = &metadata.pvp;
    let beam = pvp.added("BeamID").cloned();
    for ch in 0..block.num_channels() {
        let array = block.channel_mut(ch).expect("channel exists");
        for v in 0..array.num_vectors() {
            let t = v as f64 * 0.25;
            array.set_f64(v, &pvp.tx_time, t).expect("TxTime");
            array.set_f64(v, &pvp.rcv_time, t + 0.0057).expect("RcvTime");
            array
                .set_vector3(v, &pvp.tx_pos, &Vector3::new(-1.9e6 + 7000.0 * t, -5.6e6, 4.1e6))
                .expect("TxPos");
            array.set_vector3(v, &pvp.srp_pos, &metadata.reference_geometry.srp.ecf).expect("SRPPos");
            array.set_f64(v, &pvp.fx1, 9.95e9).expect("FX1");
            array.set_f64(v, &pvp.fx2, 1.005e10).expect("FX2");
            array.set_f64(v, &pvp.scss, 1.0e7).expect("SCSS");
            if let Some(beam) = &beam {
                array.set_i64(v, beam, v as i64 - 2).expect("BeamID");
            }
        }
    }
    block
}

/// Deterministic support array contents keyed by identifier
pub fn sample_support(metadata: &Metadata) -> BTreeMap<String, Vec<u8>> {
    let mut arrays = BTreeMap::new();
    for descriptor in &metadata.data.support_arrays {
        let count = (descriptor.num_rows * descriptor.num_cols * descriptor.bytes_per_element / 4) as usize;
        let bytes = (0..count)
            .flat_map(|i| (i as f32 * 0.5 - 1.0).to_be_bytes())
            .collect();
        arrays.insert(descriptor.identifier.clone(), bytes);
    }
    arrays
}

pub fn sample_signal() -> Array2<SarComplex> {
    Array2::from_shape_fn((NUM_VECTORS as usize, NUM_SAMPLES as usize), |(v, s)| {
        SarComplex::new(v as f32 * 10.0 + s as f32, -(s as f32) * 0.5)
    })
}

/// Support, PVP and signal payloads for `metadata`
pub fn sample_blocks(metadata: &Metadata) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let support = SupportBlock::assemble(&metadata.data, &sample_support(metadata)).expect("support block");
    let pvp = sample_pvp(metadata).to_bytes(&metadata.data).expect("PVP block");
    let signal = cphd::io::signal_block::encode(&sample_signal(), metadata.data.signal_array_format)
        .expect("signal block");
    (support, pvp, signal)
}
