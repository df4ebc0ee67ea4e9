use std::path::{Path, PathBuf};

use lyra_config::EditorConfig;
use lyra_engine::scene::{DemoShapes, Scene};
use lyra_engine::viewport::ViewState;
use lyra_io::{DocumentLoader, XmlProjectFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 文档来源，便于前端呈现加载信息。
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    Xml(PathBuf),
    Demo,
    New,
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: DocumentSource,
    pub demo_shapes: Option<DemoShapes>,
}

/// 按编辑器配置创建空会话：视口尺寸、界面缩放和初始缩放级别。
pub fn new_scene(editor: &EditorConfig) -> Scene {
    let mut scene = Scene::new();
    *scene.view_mut() = ViewState::new(
        editor.viewport_width,
        editor.viewport_height,
        editor.display_scale,
    );
    scene.view_mut().set_zoom(editor.initial_zoom);
    scene
}

/// 指定了工程文件时从 XML 读取，读取失败直接返回错误；
/// 否则新建默认工程，`demo` 为真时填充示例图形。
pub fn load_scene(
    project: Option<&Path>,
    demo: bool,
    editor: &EditorConfig,
) -> Result<LoadedScene, FrontendError> {
    let mut scene = new_scene(editor);

    if let Some(path) = project {
        let document = XmlProjectFacade::new().load(path)?;
        info!(path = %path.display(), shapes = document.len(), "从 XML 加载工程成功");
        if demo {
            warn!("已指定工程文件，忽略示例图形");
        }
        scene.load_document(document);
        scene.view_mut().set_zoom(editor.initial_zoom);
        return Ok(LoadedScene {
            scene,
            source: DocumentSource::Xml(path.to_path_buf()),
            demo_shapes: None,
        });
    }

    if !demo {
        info!("新建空白工程");
        return Ok(LoadedScene {
            scene,
            source: DocumentSource::New,
            demo_shapes: None,
        });
    }

    let demo_shapes = scene.populate_demo()?;
    // 选中圆与旋转矩形后聚焦。
    scene.select(&demo_shapes.circle, false)?;
    scene.select(&demo_shapes.filled_rectangle, true)?;
    scene.focus_on_selection();
    info!(shapes = scene.document().len(), "已构建内置示例工程");

    Ok(LoadedScene {
        scene,
        source: DocumentSource::Demo,
        demo_shapes: Some(demo_shapes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_scene_applies_editor_config() {
        let editor = EditorConfig {
            initial_zoom: 12.0,
            viewport_width: 640.0,
            viewport_height: 480.0,
            display_scale: 2.0,
            ..EditorConfig::default()
        };
        let scene = new_scene(&editor);
        assert_eq!(scene.view().zoom(), 10.0);
        assert_eq!(scene.view().width(), 640.0);
        assert_eq!(scene.view().height(), 480.0);
        assert_eq!(scene.view().display_scale(), 2.0);
        assert!(scene.document().is_empty());
    }

    #[test]
    fn demo_selects_and_focuses() {
        let loaded = load_scene(None, true, &EditorConfig::default()).expect("demo");
        assert_eq!(loaded.source, DocumentSource::Demo);
        let shapes = loaded.demo_shapes.expect("demo shapes");
        assert_eq!(loaded.scene.document().len(), 7);
        assert_eq!(
            loaded.scene.selection(),
            vec![shapes.circle.as_str(), shapes.filled_rectangle.as_str()]
        );
    }

    #[test]
    fn missing_project_is_an_error() {
        let result = load_scene(
            Some(Path::new("/nonexistent/lyra/project.xml")),
            false,
            &EditorConfig::default(),
        );
        assert!(matches!(result, Err(FrontendError::Io(_))));
    }
}
