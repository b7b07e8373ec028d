//! End-to-end conversion of in-memory result archives.
//!
//! Covers the whole frame pipeline:
//! 1. Build the global index over the selected instances
//! 2. Classify, split and assemble every field output
//! 3. Render and write the VTU document, the PVD manifest and the history CSV

use std::fs;

use odbx_io::{
    ConversionConfig, ConvertError, FrameSelection, HistoryTable, OrientationConfig, OutputLayout,
    StepFrames, Transcoder, build_collection, write_collection,
};
use odbx_model::{
    ArchiveFrame, ArchiveStep, DataBlock, DataKind, Element, FieldOutput, HistoryOutput,
    HistoryRegion, Instance, Node, Position, ResultArchive, SectionPoint,
};

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Instance A: 2 nodes, one triangle. Instance B: 3 nodes, one quad.
fn two_part_mesh() -> Vec<Instance> {
    vec![
        Instance::new(
            "A",
            vec![Node::new(11, 0.0, 0.0, 0.0), Node::new(12, 1.0, 0.0, 0.0)],
            vec![Element::new(1, "S3R", vec![11, 12, 11])],
        ),
        Instance::new(
            "B",
            vec![
                Node::new(1, 0.0, 1.0, 0.0),
                Node::new(2, 1.0, 1.0, 0.0),
                Node::new(3, 1.0, 2.0, 0.0),
            ],
            vec![Element::new(5, "S4R", vec![1, 2, 3, 1])],
        ),
    ]
}

fn frame_fields() -> Vec<FieldOutput> {
    let top = SectionPoint::new(1, "_top");
    let bottom = SectionPoint::new(2, "_bottom");

    let temperature = FieldOutput::new("NT11", DataKind::Scalar, vec![], Position::Nodal)
        .with_block(DataBlock::new(
            "A",
            Position::Nodal,
            vec![11, 12],
            vec![vec![20.0], vec![21.0]],
        ))
        .with_block(DataBlock::new(
            "B",
            Position::Nodal,
            vec![1, 2, 3],
            vec![vec![22.0], vec![23.0], vec![24.0]],
        ));

    let displacement = FieldOutput::new("U", DataKind::Vector, labels(&["U1", "U2", "U3"]), Position::Nodal)
        .with_block(DataBlock::new("B", Position::Nodal, vec![3], vec![vec![0.1, 0.2, 0.3]]));

    // A has a single integration point on its triangle, B two on its quad
    let stress = FieldOutput::new(
        "S",
        DataKind::Tensor3dSurface,
        labels(&["S11", "S22"]),
        Position::IntegrationPoint,
    )
    .with_block(
        DataBlock::new("A", Position::IntegrationPoint, vec![1], vec![vec![1.0, 2.0]])
            .with_section_point(top.clone())
            .with_integration_points(vec![1]),
    )
    .with_block(
        DataBlock::new("A", Position::IntegrationPoint, vec![1], vec![vec![-1.0, -2.0]])
            .with_section_point(bottom.clone())
            .with_integration_points(vec![1]),
    )
    .with_block(
        DataBlock::new(
            "B",
            Position::IntegrationPoint,
            vec![5, 5],
            vec![vec![3.0, 4.0], vec![5.0, 6.0]],
        )
        .with_section_point(top.clone())
        .with_integration_points(vec![1, 2]),
    )
    .with_block(
        DataBlock::new("A", Position::Centroid, vec![1], vec![vec![1.5, 2.5]])
            .with_section_point(top.clone())
            .with_local_coord_system(vec![vec![0.0, 0.0, 0.0, 1.0]]),
    )
    .with_block(
        DataBlock::new("B", Position::Centroid, vec![5], vec![vec![4.0, 5.0]])
            .with_section_point(top)
            .with_local_coord_system(vec![vec![0.0, 0.0, 0.0, 1.0]]),
    )
    .with_block(
        DataBlock::new("A", Position::Centroid, vec![1], vec![vec![-1.5, -2.5]])
            .with_section_point(bottom),
    );

    vec![temperature, displacement, stress]
}

fn archive() -> ResultArchive {
    ResultArchive {
        instances: two_part_mesh(),
        steps: vec![
            ArchiveStep {
                name: "Step1".to_string(),
                frames: vec![
                    ArchiveFrame::new(0.0, frame_fields()),
                    ArchiveFrame::new(0.5, frame_fields()),
                ],
                history_regions: vec![HistoryRegion::new(
                    "Assembly ASSEMBLY",
                    vec![
                        HistoryOutput::new("ALLIE", vec![(0.0, 0.0), (0.5, 1.0)]),
                        HistoryOutput::new("ALLKE", vec![(0.0, 2.0)]),
                    ],
                )],
            },
            ArchiveStep {
                name: "Step2".to_string(),
                frames: vec![ArchiveFrame::new(1.0, frame_fields())],
                history_regions: vec![],
            },
        ],
    }
}

/// Text between `<DataArray ... Name="{name}" ...>` and its closing tag
fn array_body<'d>(doc: &'d str, name: &str) -> Vec<&'d str> {
    let marker = format!("Name=\"{name}\"");
    let start = doc.find(&marker).unwrap_or_else(|| panic!("array {name} missing"));
    let body_start = start + doc[start..].find('\n').expect("header line ends") + 1;
    let body_end = body_start + doc[body_start..].find("</DataArray>").expect("array closes");
    doc[body_start..body_end].lines().collect()
}

fn array_header<'d>(doc: &'d str, name: &str) -> &'d str {
    let marker = format!("Name=\"{name}\"");
    let start = doc.find(&marker).unwrap_or_else(|| panic!("array {name} missing"));
    let line_start = doc[..start].rfind('\n').map_or(0, |i| i + 1);
    let line_end = start + doc[start..].find('\n').expect("header line ends");
    &doc[line_start..line_end]
}

fn transcoder<'a>(archive: &'a ResultArchive, config: &'a ConversionConfig) -> Transcoder<'a, ResultArchive> {
    let instances = labels(&["A", "B"]);
    Transcoder::new(archive, &instances, &config.catalog(), &config.orientation)
        .expect("mesh converts")
}

#[test]
fn two_instances_share_one_dense_numbering() {
    let archive = archive();
    let config = ConversionConfig::default();
    let transcoder = transcoder(&archive, &config);

    let index = transcoder.index();
    assert_eq!(index.node_count(), 5);
    assert_eq!(index.element_count(), 2);
    assert_eq!(index.nodes.get("A", 11), Some(0));
    assert_eq!(index.nodes.get("A", 12), Some(1));
    assert_eq!(index.nodes.get("B", 1), Some(2));
    assert_eq!(index.nodes.get("B", 3), Some(4));

    let doc = transcoder.render_frame("Step1", 0).expect("frame renders");
    assert!(doc.contains("<Piece NumberOfPoints=\"5\" NumberOfCells=\"2\">"));
    assert_eq!(array_body(&doc, "types"), vec!["5", "9"]);
    assert_eq!(array_body(&doc, "connectivity"), vec!["0 1 0", "2 3 4 2"]);
    assert_eq!(array_body(&doc, "offsets"), vec!["3", "7"]);
}

#[test]
fn scalar_without_labels_gets_one_default_component() {
    let archive = archive();
    let config = ConversionConfig::default();
    let doc = transcoder(&archive, &config).render_frame("Step1", 0).unwrap();

    let header = array_header(&doc, "NT11");
    assert!(header.contains("NumberOfComponents=\"1\""));
    assert!(header.contains("ComponentName0=\"0\""));
    assert_eq!(array_body(&doc, "NT11"), vec!["20", "21", "22", "23", "24"]);
}

#[test]
fn sparse_nodal_field_is_zero_filled() {
    let archive = archive();
    let config = ConversionConfig::default();
    let doc = transcoder(&archive, &config).render_frame("Step1", 0).unwrap();

    assert_eq!(
        array_body(&doc, "U"),
        vec!["0 0 0", "0 0 0", "0 0 0", "0 0 0", "0.1 0.2 0.3"]
    );
    assert!(doc.contains("<PointData Vectors=\"'U'\" Scalars=\"'NT11'\">"));
}

#[test]
fn layered_integration_point_field_splits_and_expands() {
    let archive = archive();
    let config = ConversionConfig::default();
    let doc = transcoder(&archive, &config).render_frame("Step1", 0).unwrap();

    // centroid arrays, one per section point
    assert_eq!(array_body(&doc, "S_Centroid_top"), vec!["1.5 2.5", "4 5"]);
    assert_eq!(array_body(&doc, "S_Centroid_bottom"), vec!["-1.5 -2.5", "0 0"]);

    // two points max: 2 components x 2 points, triangle padded with zeros
    let header = array_header(&doc, "S_IntegrationPoints_top");
    assert!(header.contains("NumberOfComponents=\"4\""));
    assert!(header.contains("ComponentName2=\"S11\" ComponentName3=\"S22\""));
    assert_eq!(
        array_body(&doc, "S_IntegrationPoints_top"),
        vec!["1 2 0 0", "3 4 5 6"]
    );
    assert_eq!(
        array_body(&doc, "S_IntegrationPoints_bottom"),
        vec!["-1 -2 0 0", "0 0 0 0"]
    );

    assert!(doc.contains(
        "<CellData Tensors=\"'S_Centroid_top','S_Centroid_bottom','S_IntegrationPoints_top','S_IntegrationPoints_bottom'\" Vectors=\"'Material_Orientation'\">"
    ));
}

#[test]
fn centroid_fields_are_cell_data_and_element_nodal_fields_are_skipped() {
    let mut archive = archive();
    let fields = &mut archive.steps[0].frames[0].fields;
    // no component labels: positional names from the row width
    fields.push(
        FieldOutput::new("CF", DataKind::Vector, vec![], Position::Centroid)
            .with_block(DataBlock::new("A", Position::Centroid, vec![1], vec![vec![1.0, 2.0]])),
    );
    fields.push(
        FieldOutput::new("SENER", DataKind::Scalar, vec![], Position::ElementNodal).with_block(
            DataBlock::new("B", Position::ElementNodal, vec![5, 5, 5, 5], vec![vec![9.0]; 4]),
        ),
    );

    let config = ConversionConfig::default();
    let doc = transcoder(&archive, &config).render_frame("Step1", 0).unwrap();

    let header = array_header(&doc, "CF");
    assert!(header.contains("NumberOfComponents=\"2\" ComponentName0=\"0\" ComponentName1=\"1\""));
    assert_eq!(array_body(&doc, "CF"), vec!["1 2", "0 0"]);

    let cell_start = doc.find("<CellData").unwrap();
    let cell_end = doc.find("</CellData>").unwrap();
    let at = doc.find("Name=\"CF\"").unwrap();
    assert!(cell_start < at && at < cell_end);
    assert!(doc.contains("Vectors=\"'CF','Material_Orientation'\""));

    assert!(!doc.contains("SENER"));
}

#[test]
fn orientation_uses_first_section_point() {
    let archive = archive();
    let config = ConversionConfig::default();
    let doc = transcoder(&archive, &config).render_frame("Step1", 0).unwrap();
    assert_eq!(array_body(&doc, "Material_Orientation"), vec!["1 0 0", "1 0 0"]);
}

#[test]
fn orientation_can_be_disabled_or_missing() {
    let archive = archive();
    let mut config = ConversionConfig::default();
    config.orientation = OrientationConfig {
        enabled: false,
        ..OrientationConfig::default()
    };
    let doc = transcoder(&archive, &config).render_frame("Step1", 0).unwrap();
    assert!(!doc.contains("Material_Orientation"));

    let mut config = ConversionConfig::default();
    config.orientation.source_field = "SDV1".to_string();
    let doc = transcoder(&archive, &config).render_frame("Step1", 0).unwrap();
    assert!(!doc.contains("Material_Orientation"));
}

#[test]
fn malformed_integration_point_block_fails_the_frame() {
    let mut archive = archive();
    let bad = FieldOutput::new("E", DataKind::Tensor3dFull, labels(&["E11"]), Position::IntegrationPoint)
        .with_block(
            DataBlock::new("B", Position::IntegrationPoint, vec![5, 5, 5], vec![vec![0.0]; 3])
                .with_integration_points(vec![1, 2, 1]),
        );
    archive.steps[0].frames[1].fields.push(bad);

    let config = ConversionConfig::default();
    let transcoder = transcoder(&archive, &config);
    assert!(transcoder.render_frame("Step1", 0).is_ok());
    assert!(matches!(
        transcoder.render_frame("Step1", 1),
        Err(ConvertError::Reshape { rows: 3, points: 2, .. })
    ));
}

#[test]
fn unknown_names_fail_before_anything_is_written() {
    let archive = archive();
    let config = ConversionConfig::default();

    let missing = Transcoder::new(&archive, &labels(&["A", "C"]), &config.catalog(), &config.orientation);
    assert!(matches!(missing, Err(ConvertError::Source(_))));

    let transcoder = transcoder(&archive, &config);
    let dir = tempfile::tempdir().expect("temp dir");
    let layout = OutputLayout::new(dir.path(), "run");
    assert!(transcoder.write_frame(&layout, "Step3", 0).is_err());
    assert!(transcoder.write_frame(&layout, "Step1", 7).is_err());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unknown_element_type_aborts_the_run() {
    let mut archive = archive();
    archive.instances[1].elements[0].type_tag = "SPRINGA".to_string();
    let config = ConversionConfig::default();
    let result = Transcoder::new(&archive, &labels(&["A", "B"]), &config.catalog(), &config.orientation);
    assert!(matches!(result, Err(ConvertError::UnknownElementType(tag)) if tag == "SPRINGA"));
}

#[test]
fn writes_frames_manifest_and_history() {
    let archive = archive();
    let config = ConversionConfig::default();
    let transcoder = transcoder(&archive, &config);

    let dir = tempfile::tempdir().expect("temp dir");
    let layout = OutputLayout::new(dir.path().join("plate"), "plate");
    layout.create().expect("output dir");

    let selection: FrameSelection = [StepFrames::new("Step2", vec![0]), StepFrames::new("Step1", vec![0, 1])]
        .into_iter()
        .collect();

    let outcomes = transcoder.write_frames_parallel(&layout, &selection);
    let written: Vec<_> = outcomes
        .iter()
        .map(|o| (o.step.as_str(), o.frame, o.result.is_ok()))
        .collect();
    assert_eq!(written, vec![("Step2", 0, true), ("Step1", 0, true), ("Step1", 1, true)]);
    for name in ["Step2_0.vtu", "Step1_0.vtu", "Step1_1.vtu"] {
        assert!(layout.dir().join(name).exists(), "{name} should exist");
    }

    let sequential = transcoder.render_frame("Step1", 1).unwrap();
    let parallel = fs::read_to_string(layout.frame_path("Step1", 1)).unwrap();
    assert_eq!(sequential, parallel);

    let entries = build_collection(&archive, &selection).unwrap();
    write_collection(layout.collection_path(), &entries).unwrap();
    let pvd = fs::read_to_string(layout.collection_path()).unwrap();
    let datasets: Vec<&str> = pvd.lines().filter(|l| l.contains("<DataSet")).map(str::trim).collect();
    assert_eq!(
        datasets,
        vec![
            "<DataSet timestep=\"1\" part=\"0\" file=\"Step2_0.vtu\"/>",
            "<DataSet timestep=\"0\" part=\"1\" file=\"Step1_0.vtu\"/>",
            "<DataSet timestep=\"0.5\" part=\"2\" file=\"Step1_1.vtu\"/>",
        ]
    );

    let table = HistoryTable::collect(&archive, selection.step_names()).unwrap();
    table.write(layout.history_path()).unwrap();
    let csv = fs::read_to_string(layout.history_path()).unwrap();
    assert_eq!(
        csv,
        "Step1_Assembly ASSEMBLY_ALLIE,Step1_Assembly ASSEMBLY_ALLKE\n0.000000,2.000000\n1.000000,0.000000\n"
    );
}

#[test]
fn one_failing_frame_does_not_stop_the_others() {
    let mut archive = archive();
    archive.steps[0].frames[0].fields[1].locations.push(Position::Centroid);
    let config = ConversionConfig::default();
    let transcoder = transcoder(&archive, &config);

    let dir = tempfile::tempdir().expect("temp dir");
    let layout = OutputLayout::new(dir.path(), "run");
    let selection: FrameSelection = [StepFrames::new("Step1", vec![0, 1])].into_iter().collect();

    let outcomes = transcoder.write_frames(&layout, &selection);
    assert!(matches!(
        outcomes[0].result,
        Err(ConvertError::LocationCount { count: 2, .. })
    ));
    assert!(outcomes[1].result.is_ok());
    assert!(!layout.frame_path("Step1", 0).exists());
    assert!(layout.frame_path("Step1", 1).exists());
}
