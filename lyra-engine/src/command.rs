use std::collections::HashMap;

use lyra_core::shape::ShapeKind;

use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// 解析 `名称 参数...` 形式的命令行文本，按空白分隔。
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next()?;
        Some(Self {
            name: name.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(FocusSelectionCommand);
        bus.register(ClearSelectionCommand);
        bus.register(SelectAllCommand);
        bus.register(SelectCommand);
        bus.register(RemoveSelectionCommand);
        bus.register(DuplicateSelectionCommand);
        bus.register(AddShapeCommand);
        bus.register(ZoomCommand::In);
        bus.register(ZoomCommand::Out);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    /// 已注册命令名称，按字母序。
    pub fn available_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

struct FocusSelectionCommand;

impl CommandHandler for FocusSelectionCommand {
    fn name(&self) -> &'static str {
        "focus_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.focus_on_selection();
        CommandResponse::ok("视图已居中到当前选中图形")
    }
}

struct ClearSelectionCommand;

impl CommandHandler for ClearSelectionCommand {
    fn name(&self) -> &'static str {
        "clear_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.clear_selection();
        CommandResponse::ok("选中集已清空")
    }
}

struct SelectAllCommand;

impl CommandHandler for SelectAllCommand {
    fn name(&self) -> &'static str {
        "select_all"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.select_all();
        CommandResponse::ok(format!("已选中 {} 个图形", context.scene.selection_len()))
    }
}

/// `select <名称>`：名称可以包含空格，参数按空格重新拼接。
struct SelectCommand;

impl CommandHandler for SelectCommand {
    fn name(&self) -> &'static str {
        "select"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if request.args.is_empty() {
            return CommandResponse::err("select 需要图形名称");
        }
        let name = request.args.join(" ");
        match context.scene.select(&name, true) {
            Ok(()) => CommandResponse::ok(format!("已选中 {name}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct RemoveSelectionCommand;

impl CommandHandler for RemoveSelectionCommand {
    fn name(&self) -> &'static str {
        "remove_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let removed = context.scene.remove_selection();
        CommandResponse::ok(format!("已删除 {removed} 个图形"))
    }
}

struct DuplicateSelectionCommand;

impl CommandHandler for DuplicateSelectionCommand {
    fn name(&self) -> &'static str {
        "duplicate_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        match context.scene.duplicate_selection() {
            Ok(copies) if copies.is_empty() => CommandResponse::err("没有选中的图形"),
            Ok(copies) => CommandResponse::ok(format!("已复制: {}", copies.join(", "))),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

/// `add_shape <种类>`，种类名见 [`ShapeKind::parse`]。
struct AddShapeCommand;

impl CommandHandler for AddShapeCommand {
    fn name(&self) -> &'static str {
        "add_shape"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let raw = request.args.join(" ");
        let Some(kind) = ShapeKind::parse(&raw) else {
            return CommandResponse::err(format!("未知图形种类: {raw}"));
        };
        match context.scene.create_shape(kind) {
            Ok(name) => CommandResponse::ok(format!("已添加 {name}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

/// `zoom_in [步数]` / `zoom_out [步数]`，默认一步。
enum ZoomCommand {
    In,
    Out,
}

impl CommandHandler for ZoomCommand {
    fn name(&self) -> &'static str {
        match self {
            ZoomCommand::In => "zoom_in",
            ZoomCommand::Out => "zoom_out",
        }
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let steps = match request.args.first() {
            Some(raw) => match raw.parse::<u32>() {
                Ok(steps) => steps,
                Err(_) => return CommandResponse::err(format!("无效的步数: {raw}")),
            },
            None => 1,
        };
        let view = context.scene.view_mut();
        match self {
            ZoomCommand::In => view.zoom_in(steps, None),
            ZoomCommand::Out => view.zoom_out(steps, None),
        }
        CommandResponse::ok(format!("缩放级别: {:.1}", view.zoom()))
    }
}
