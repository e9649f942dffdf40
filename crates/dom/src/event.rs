use crate::NodeKey;

/// Native event classes the bridge subscribes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeEventClass {
    Click,
    DoubleClick,
    MouseDown,
    MouseUp,
    Input,
    KeyDown,
    KeyPress,
    Focus,
    Blur,
    MouseEnter,
    MouseLeave,
}

impl NativeEventClass {
    pub const ALL: [NativeEventClass; 11] = [
        NativeEventClass::Click,
        NativeEventClass::DoubleClick,
        NativeEventClass::MouseDown,
        NativeEventClass::MouseUp,
        NativeEventClass::Input,
        NativeEventClass::KeyDown,
        NativeEventClass::KeyPress,
        NativeEventClass::Focus,
        NativeEventClass::Blur,
        NativeEventClass::MouseEnter,
        NativeEventClass::MouseLeave,
    ];

    /// Where a listener for this class is attached.
    pub fn listen_target(self) -> ListenTarget {
        match self {
            NativeEventClass::MouseEnter | NativeEventClass::MouseLeave => ListenTarget::Body,
            _ => ListenTarget::Window,
        }
    }

    /// Focus, blur, enter and leave do not bubble, so they are observed while capturing.
    pub fn phase(self) -> Phase {
        match self {
            NativeEventClass::Focus
            | NativeEventClass::Blur
            | NativeEventClass::MouseEnter
            | NativeEventClass::MouseLeave => Phase::Capture,
            _ => Phase::Bubble,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenTarget {
    Window,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Capture,
    Bubble,
}

/// Opaque handle returned by [`HostSurface::listen`](crate::HostSurface::listen).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u32);

/// Keyboard payload; zeroed for non-key events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyInfo {
    pub key_code: u32,
    pub char_code: u32,
    pub repeat: bool,
}

/// One native event as delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeEvent {
    pub class: NativeEventClass,
    pub target: NodeKey,
    pub key: KeyInfo,
}

impl NativeEvent {
    pub fn new(class: NativeEventClass, target: NodeKey) -> Self {
        Self {
            class,
            target,
            key: KeyInfo::default(),
        }
    }

    pub fn key_down(target: NodeKey, key_code: u32, repeat: bool) -> Self {
        Self {
            class: NativeEventClass::KeyDown,
            target,
            key: KeyInfo {
                key_code,
                char_code: 0,
                repeat,
            },
        }
    }

    pub fn key_press(target: NodeKey, char_code: u32) -> Self {
        Self {
            class: NativeEventClass::KeyPress,
            target,
            key: KeyInfo {
                key_code: char_code,
                char_code,
                repeat: false,
            },
        }
    }
}
