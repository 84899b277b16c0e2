// Imports
use crate::cli::{self, OnConflict};
use oofcanvas::{Canvas, ExportFormat, ExportPrefs};
use oofcanvas_compose::Coord;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

pub(crate) async fn run_export(
    scene_file: &Path,
    output_file: Option<PathBuf>,
    format: Option<ExportFormat>,
    max_pixels: u32,
    draw_background: bool,
    region: Option<(Coord, Coord)>,
    on_conflict: OnConflict,
) -> anyhow::Result<()> {
    let (output_file, format) = output_file_and_format(scene_file, output_file, format)?;
    let output_file = match check_file_conflict(&output_file, on_conflict)? {
        Some(output_file) => output_file,
        None => {
            println!("Skipped \"{}\"", output_file.display());
            return Ok(());
        }
    };

    let scene_file_disp = scene_file.display().to_string();
    let output_file_disp = output_file.display().to_string();
    let pb = cli::new_progressbar(format!(
        "Exporting \"{scene_file_disp}\" to: \"{output_file_disp}\""
    ));

    let prefs = ExportPrefs {
        max_pixels,
        draw_background,
        format,
    };
    if let Err(e) = export_to_file(scene_file, &output_file, &prefs, region).await {
        let msg = format!("Export \"{scene_file_disp}\" to: \"{output_file_disp}\" failed, Err {e:?}");
        if pb.is_hidden() {
            println!("{msg}")
        }
        pb.abandon_with_message(msg);
        return Err(e);
    }
    let msg = format!("Export \"{scene_file_disp}\" to: \"{output_file_disp}\" succeeded");
    if pb.is_hidden() {
        println!("{msg}")
    }
    pb.finish_with_message(msg);
    Ok(())
}

/// The output file and the format.
///
/// An explicit format wins over the extension of the output file. Without an output file,
/// the scene file is used with the extension of the format.
pub(crate) fn output_file_and_format(
    scene_file: &Path,
    output_file: Option<PathBuf>,
    format: Option<ExportFormat>,
) -> anyhow::Result<(PathBuf, ExportFormat)> {
    match (output_file, format) {
        (Some(output_file), Some(format)) => Ok((output_file, format)),
        (Some(output_file), None) => {
            let format = ExportFormat::from_path(&output_file).ok_or_else(|| {
                anyhow::anyhow!(
                    "Could not determine the export format from output file \"{}\", use --format",
                    output_file.display()
                )
            })?;
            Ok((output_file, format))
        }
        (None, format) => {
            let format = format.unwrap_or_default();
            let mut output_file = scene_file.to_path_buf();
            output_file.set_extension(format.file_ext());
            Ok((output_file, format))
        }
    }
}

/// Resolves a conflict with an existing output file. Returns the file to write to, None if the export is skipped.
pub(crate) fn check_file_conflict(
    output_file: &Path,
    mut on_conflict: OnConflict,
) -> anyhow::Result<Option<PathBuf>> {
    if !output_file.exists() {
        return Ok(Some(output_file.to_path_buf()));
    }
    if on_conflict == OnConflict::Ask {
        if !std::io::stdout().is_terminal() {
            return Err(anyhow::anyhow!(
                "File conflict detected and terminal is not interactive. Please supply --on-conflict"
            ));
        }
        let options = &[OnConflict::Overwrite, OnConflict::Skip, OnConflict::Suffix];
        match dialoguer::Select::new()
            .with_prompt(format!("File \"{}\" already exists:", output_file.display()))
            .items(options)
            .default(0)
            .interact()
        {
            Ok(c) => on_conflict = options[c],
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Failed to show select prompt, retry or select an behavior with --on-conflict, {e:?}"
                ))
            }
        }
    }
    match on_conflict {
        OnConflict::Ask => Err(anyhow::anyhow!("Failed to save user choice!")),
        OnConflict::Overwrite => Ok(Some(output_file.to_path_buf())),
        OnConflict::Skip => Ok(None),
        OnConflict::Suffix => suffixed_path(output_file).map(Some),
    }
}

/// The first path with `_<n>` appended to the file stem that doesn't exist yet.
pub(crate) fn suffixed_path(path: &Path) -> anyhow::Result<PathBuf> {
    let Some(file_stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
        return Err(anyhow::anyhow!("Failed to get file stem"));
    };
    let ext = path
        .extension()
        .map(|n| format!(".{}", n.to_string_lossy()))
        .unwrap_or_default();
    let mut new_path = path.to_path_buf();
    let mut i = 0;
    while new_path.exists() {
        i += 1;
        new_path.set_file_name(format!("{file_stem}_{i}{ext}"));
    }
    Ok(new_path)
}

pub(crate) async fn export_to_file(
    scene_file: &Path,
    output_file: &Path,
    prefs: &ExportPrefs,
    region: Option<(Coord, Coord)>,
) -> anyhow::Result<()> {
    let canvas = cli::load_canvas(scene_file).await?;
    let bytes = export_bytes(&canvas, prefs, region)?
        .ok_or_else(|| anyhow::anyhow!("Nothing to export, the scene has no visible items"))?;
    cli::create_overwrite_file_w_bytes(output_file, &bytes).await?;
    Ok(())
}

fn export_bytes(
    canvas: &Canvas,
    prefs: &ExportPrefs,
    region: Option<(Coord, Coord)>,
) -> anyhow::Result<Option<Vec<u8>>> {
    let bytes = match region {
        Some((pt0, pt1)) => canvas.export_region_bytes(
            prefs.format,
            prefs.max_pixels,
            prefs.draw_background,
            pt0,
            pt1,
        )?,
        None => canvas.export_bytes(prefs)?,
    };
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_and_output_file() {
        let scene = Path::new("drawings/scene.json");
        let (file, format) = output_file_and_format(scene, None, None).unwrap();
        assert_eq!(file, PathBuf::from("drawings/scene.png"));
        assert_eq!(format, ExportFormat::Png);

        let (file, format) = output_file_and_format(scene, None, Some(ExportFormat::Pdf)).unwrap();
        assert_eq!(file, PathBuf::from("drawings/scene.pdf"));
        assert_eq!(format, ExportFormat::Pdf);

        let (_, format) =
            output_file_and_format(scene, Some(PathBuf::from("out.pdf")), None).unwrap();
        assert_eq!(format, ExportFormat::Pdf);
        assert!(output_file_and_format(scene, Some(PathBuf::from("out.svg")), None).is_err());
    }

    #[test]
    fn no_conflict_without_file() {
        let path = Path::new("/nonexistent/out.png");
        assert_eq!(
            check_file_conflict(path, OnConflict::Ask).unwrap(),
            Some(path.to_path_buf())
        );
        assert_eq!(suffixed_path(path).unwrap(), path.to_path_buf());
    }

    const SCENE: &str = r#"{
        "layers": [
            {
                "name": "shapes",
                "items": [
                    { "item": { "rectangle": {
                        "p0": [0.0, 0.0], "p1": [10.0, 5.0],
                        "style": { "fill": { "r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0 } }
                    } } }
                ]
            }
        ]
    }"#;

    #[test]
    fn export_scene_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let scene_file = dir.path().join("scene.json");
        std::fs::write(&scene_file, SCENE).unwrap();
        let (output_file, format) = output_file_and_format(&scene_file, None, None).unwrap();
        assert_eq!(output_file, dir.path().join("scene.png"));

        let prefs = ExportPrefs {
            max_pixels: 100,
            draw_background: true,
            format,
        };
        smol::block_on(export_to_file(&scene_file, &output_file, &prefs, None)).unwrap();
        let bytes = std::fs::read(&output_file).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));

        let region = Some((na::vector![0.0, 0.0], na::vector![5.0, 5.0]));
        let pdf_file = dir.path().join("region.pdf");
        let prefs = ExportPrefs {
            format: ExportFormat::Pdf,
            ..prefs
        };
        smol::block_on(export_to_file(&scene_file, &pdf_file, &prefs, region)).unwrap();
        assert!(std::fs::read(&pdf_file).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn export_scene_without_items_fails() {
        let dir = tempfile::tempdir().unwrap();
        let scene_file = dir.path().join("empty.json");
        std::fs::write(&scene_file, r#"{ "layers": [ { "name": "empty" } ] }"#).unwrap();
        let output_file = dir.path().join("empty.png");
        let result = smol::block_on(export_to_file(
            &scene_file,
            &output_file,
            &ExportPrefs::default(),
            None,
        ));
        assert!(result.is_err());
        assert!(!output_file.exists());
    }

    #[test]
    fn resolve_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let output_file = dir.path().join("out.png");
        std::fs::write(&output_file, b"existing").unwrap();

        assert_eq!(
            check_file_conflict(&output_file, OnConflict::Overwrite).unwrap(),
            Some(output_file.clone())
        );
        assert_eq!(
            check_file_conflict(&output_file, OnConflict::Skip).unwrap(),
            None
        );
        let suffixed = check_file_conflict(&output_file, OnConflict::Suffix)
            .unwrap()
            .unwrap();
        assert_eq!(suffixed, dir.path().join("out_1.png"));

        std::fs::write(&suffixed, b"existing").unwrap();
        assert_eq!(
            suffixed_path(&output_file).unwrap(),
            dir.path().join("out_2.png")
        );
    }
}
