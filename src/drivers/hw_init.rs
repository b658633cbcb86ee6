//! One-shot hardware peripheral initialization.
//!
//! Configures the thermistor ADC channels, the flow-switch GPIO and the
//! radio UART using raw ESP-IDF sys calls.  Called once from `main()`
//! before the metering loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    UartInitFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={rc})"),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
            Self::UartInitFailed(rc) => write!(f, "radio UART init failed (rc={rc})"),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the metering loop; single-threaded.
    unsafe {
        init_adc()?;
        init_flow_input()?;
        init_uart()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the metering loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: pins::THERMISTOR_ADC_ATTEN,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let ret =
        unsafe { adc_oneshot_config_channel(adc1_handle(), pins::T_HOT_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    let ret =
        unsafe { adc_oneshot_config_channel(adc1_handle(), pins::T_COLD_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    info!("hw_init: ADC1 configured (CH3=hot, CH4=cold)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: ADC1_HANDLE is written once during init_adc() before this
    // function is called; single-threaded main-loop access guaranteed.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.max(0) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(_channel: u32) -> u16 {
    0
}

// ── Flow switch input ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_flow_input() -> Result<(), HwInitError> {
    // Polled input, no interrupt: the loop debounces the level itself.
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::FLOW_SWITCH_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }

    info!("hw_init: flow switch input configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

// ── Radio UART ────────────────────────────────────────────────

/// Driver RX ring size.  Must exceed the hardware FIFO (128 bytes).
#[cfg(target_os = "espidf")]
const UART_RX_BUF_BYTES: i32 = 256;

#[cfg(target_os = "espidf")]
unsafe fn init_uart() -> Result<(), HwInitError> {
    let port = pins::RADIO_UART_NUM as uart_port_t;

    let cfg = uart_config_t {
        baud_rate: pins::RADIO_UART_BAUD as i32,
        data_bits: uart_word_length_t_UART_DATA_8_BITS,
        parity: uart_parity_t_UART_PARITY_DISABLE,
        stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
        flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
        ..Default::default()
    };
    let ret = unsafe { uart_param_config(port, &cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    let ret = unsafe {
        uart_set_pin(
            port,
            pins::RADIO_UART_TX_GPIO,
            pins::RADIO_UART_RX_GPIO,
            UART_PIN_NO_CHANGE,
            UART_PIN_NO_CHANGE,
        )
    };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    // Zero TX buffer: writes block until the frame is on the wire, which
    // is fine at one short AT command per transmit interval.
    let ret =
        unsafe { uart_driver_install(port, UART_RX_BUF_BYTES, 0, 0, core::ptr::null_mut(), 0) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::UartInitFailed(ret));
    }

    info!("hw_init: UART1 configured for radio (9600 8N1)");
    Ok(())
}

/// Non-blocking single-byte poll of the radio UART.
#[cfg(target_os = "espidf")]
pub fn uart_read_byte() -> Result<Option<u8>, i32> {
    let mut byte: u8 = 0;
    // SAFETY: driver was installed during init_uart(); zero timeout keeps
    // the metering loop from stalling on a silent module.
    let n = unsafe {
        uart_read_bytes(
            pins::RADIO_UART_NUM as uart_port_t,
            (&raw mut byte).cast::<core::ffi::c_void>(),
            1,
            0,
        )
    };
    match n {
        1 => Ok(Some(byte)),
        0 => Ok(None),
        rc => Err(rc),
    }
}

#[cfg(target_os = "espidf")]
pub fn uart_write(bytes: &[u8]) -> Result<(), i32> {
    // SAFETY: driver was installed during init_uart(); blocking write from
    // the single main task.
    let n = unsafe {
        uart_write_bytes(
            pins::RADIO_UART_NUM as uart_port_t,
            bytes.as_ptr().cast::<core::ffi::c_void>(),
            bytes.len(),
        )
    };
    if n < 0 { Err(n) } else { Ok(()) }
}
